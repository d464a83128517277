//! The checking pass: generates constraints per statement and reports the
//! failing ones.

use tt_ir::{Expression, Iid, Info, Name, ScopeId, Statement, StatementKind, Trace, VarId};
use tt_types::{Environment, TupleId, TypeLattice};

use crate::constraint::Constraint;
use crate::kind::Severity;
use crate::message::{CheckMessage, MessageLog};
use crate::CheckConfig;

/// Where a constraint's message is attributed.
#[derive(Copy, Clone, Debug)]
struct Site {
    iid: Iid,
    function_iid: Option<Iid>,
}

pub(crate) struct Monitor<'a> {
    lattice: &'a mut TypeLattice,
    trace: &'a Trace,
    env: &'a Environment,
    inferred: &'a Environment,
    config: &'a CheckConfig,
    pub(crate) log: MessageLog,
    /// Activations entered and not yet returned from; empty in global code.
    scopes: Vec<ScopeId>,
    /// Per entered function: the results of the signatures it matched.
    allowed_returns: Vec<Vec<TupleId>>,
    next_field_access_is_dynamic: bool,
    prototype: Name,
}

impl<'a> Monitor<'a> {
    pub(crate) fn new(
        lattice: &'a mut TypeLattice,
        trace: &'a Trace,
        env: &'a Environment,
        inferred: &'a Environment,
        config: &'a CheckConfig,
    ) -> Self {
        let prototype = lattice.pool().name("prototype");
        Self {
            lattice,
            trace,
            env,
            inferred,
            config,
            log: MessageLog::default(),
            scopes: Vec::new(),
            allowed_returns: Vec::new(),
            next_field_access_is_dynamic: false,
            prototype,
        }
    }

    /// Evaluate `constraint`, reporting it if it fails and its kind is
    /// enabled. Returns whether it holds.
    fn require(&mut self, site: Site, severity: Severity, constraint: &Constraint) -> bool {
        match constraint.check(self.lattice) {
            Ok(()) => true,
            Err(message) => {
                let kind = constraint.kind();
                if self.config.is_enabled(kind) {
                    self.log.report(CheckMessage {
                        message,
                        iid: site.iid,
                        function_iid: site.function_iid,
                        severity,
                        kind,
                    });
                }
                false
            }
        }
    }

    fn error(&mut self, site: Site, constraint: &Constraint) -> bool {
        self.require(site, Severity::Error, constraint)
    }

    fn warning(&mut self, site: Site, constraint: &Constraint) {
        self.require(site, Severity::Warning, constraint);
    }

    fn function_of_var(&self, var: VarId) -> Option<Iid> {
        self.trace.variables.get(var).function_iid
    }

    fn take_dynamic(&mut self) -> bool {
        std::mem::take(&mut self.next_field_access_is_dynamic)
    }

    pub(crate) fn statement(&mut self, statement: &Statement) {
        let site = Site {
            iid: statement.iid,
            function_iid: self.trace.function_iid(statement),
        };
        match &statement.kind {
            StatementKind::Write { sink, rhs } => self.write(statement.iid, *sink, rhs),
            StatementKind::FieldWrite {
                base,
                field,
                rhs,
                is_initializer,
            } => self.field_write(site, *base, *field, *rhs, *is_initializer),
            StatementKind::Delete { base, field } => self.delete(site, *base, *field),
            StatementKind::Info(info) => self.info(
                Site {
                    iid: statement.iid,
                    function_iid: None,
                },
                info,
            ),
        }
    }

    fn write(&mut self, iid: Iid, sink: VarId, rhs: &Expression) {
        let instance = self.env.get(sink);
        match *rhs {
            Expression::FieldRead { base, field } => {
                let site = Site {
                    iid,
                    function_iid: self.function_of_var(base),
                };
                self.field_read(site, base, field);
            }
            Expression::New { proto } if self.config.sjs_checks => {
                let site = Site {
                    iid,
                    function_iid: self.function_of_var(proto),
                };
                let prototype = self.env.get(proto);
                self.error(
                    site,
                    &Constraint::PrototypeProperties {
                        instance,
                        prototype,
                    },
                );
            }
            Expression::Read { .. } | Expression::New { .. } | Expression::Primitive(_) => {}
        }
    }

    fn field_read(&mut self, site: Site, base: VarId, field: Name) {
        let dynamic = self.take_dynamic();
        let base = self.env.get(base);
        self.error(site, &Constraint::IsObject(base));
        self.warning(site, &Constraint::IsNotTop(base));

        let pool = self.lattice.pool();
        let data = pool.tuple(base);
        if !data.is_object() {
            return;
        }
        let object = data.object;
        let object_data = pool.object(object);
        let name = pool.abstract_field_name(object_data, field);
        let property = object_data.property(name);
        if self.config.sjs_checks {
            self.error(
                site,
                &Constraint::ClassificationAccess {
                    object,
                    field: name,
                    dynamic,
                    is_initializer: false,
                },
            );
        }
        self.error(
            site,
            &Constraint::PropertyExists {
                object,
                field: name,
            },
        );
        if let Some(property) = property {
            self.error(
                site,
                &Constraint::NonToppyPropertyRead {
                    property,
                    enabled: self.config.toppy_checks,
                },
            );
        }
    }

    fn field_write(
        &mut self,
        site: Site,
        base_var: VarId,
        field: Name,
        rhs: VarId,
        is_initializer: bool,
    ) {
        let base = self.env.get(base_var);
        let dynamic = self.take_dynamic();
        let is_function_prototype =
            field == self.prototype && self.lattice.pool().is_function(base);
        // Initializers build fresh objects; with SJS checks only the
        // initial `.prototype` of functions is exempt.
        if is_initializer && (!self.config.sjs_checks || is_function_prototype) {
            return;
        }

        let rhs = self.env.get(rhs);
        self.error(site, &Constraint::IsObject(base));
        self.warning(site, &Constraint::IsNotTop(base));

        let pool = self.lattice.pool();
        let data = pool.tuple(base);
        if !data.is_object() {
            return;
        }
        let object = data.object;
        let name = pool.abstract_field_name(pool.object(object), field);
        if self.config.sjs_checks {
            if !is_initializer {
                self.error(site, &Constraint::PropertyIsWritable { object, field });
            }
            self.error(
                site,
                &Constraint::ClassificationAccess {
                    object,
                    field: name,
                    dynamic,
                    is_initializer,
                },
            );
        }

        if !self.error(
            site,
            &Constraint::PropertyExists {
                object,
                field: name,
            },
        ) {
            return;
        }
        let pool = self.lattice.pool();
        let property = pool.object(object).property(name).unwrap_or(TupleId::BOTTOM);
        self.error(
            site,
            &Constraint::NonToppyPropertyWrite {
                property,
                enabled: self.config.toppy_checks,
            },
        );

        if self.config.sjs_checks && is_function_prototype {
            let pool = self.lattice.pool();
            let assigned = pool.tuple(rhs);
            if assigned.is_object() {
                let allocation = pool.object(assigned.object).allocation_scope;
                let current = self.scopes.last().copied();
                self.error(
                    site,
                    &Constraint::LocalPrototypalAssignment {
                        allocation,
                        current,
                    },
                );
            }
            self.error(
                site,
                &Constraint::OverridingPrototypalAssignment {
                    current: property,
                    assigned: rhs,
                },
            );
        } else {
            let pool = self.lattice.pool();
            let message = format!(
                "Invalid assignment to .{} of type {} with type {} on {}",
                pool.interner().lookup(name),
                pool.format_tuple(property),
                pool.format_tuple(rhs),
                pool.format_tuple(base)
            );
            self.error(
                site,
                &Constraint::IsAssignmentCompatible {
                    to: property,
                    from: rhs,
                    message,
                },
            );
        }
    }

    fn delete(&mut self, site: Site, base: VarId, field: Name) {
        let base = self.env.get(base);
        self.error(site, &Constraint::IsObject(base));
        let pool = self.lattice.pool();
        let data = pool.tuple(base);
        if self.config.sjs_checks && data.is_object() {
            let object = data.object;
            let name = pool.abstract_field_name(pool.object(object), field);
            self.error(
                site,
                &Constraint::PropertyExists {
                    object,
                    field: name,
                },
            );
            self.error(site, &Constraint::PropertyIsWritable { object, field });
            self.error(site, &Constraint::IsNotClassifiedAsObject(object));
        }
        self.warning(site, &Constraint::IsNotTop(base));
    }

    fn info(&mut self, site: Site, info: &Info) {
        match info {
            Info::ForInObject { source_tmp } if self.config.sjs_checks => {
                let iterable = self.env.get(*source_tmp);
                self.error(site, &Constraint::IsObject(iterable));
                let data = self.lattice.pool().tuple(iterable);
                if data.is_object() {
                    let object = data.object;
                    self.error(site, &Constraint::IsNotClassifiedAsObject(object));
                }
            }
            Info::NextFieldAccessIsDynamic => self.next_field_access_is_dynamic = true,
            Info::FunctionEnter { scope, .. } => self.scopes.push(*scope),
            Info::FunctionReturn { .. } => {
                self.scopes.pop();
            }
            _ => {}
        }

        if let Some(base_tmp) = info.base_tmp() {
            let base = self.env.get(base_tmp);
            self.error(site, &Constraint::IsObject(base));
            self.warning(site, &Constraint::IsNotTop(base));
        }
        let Some(function_tmp) = info.function_tmp() else {
            return;
        };
        let function = self.env.get(function_tmp);
        let is_function = self.error(site, &Constraint::IsFunction(function));
        self.warning(site, &Constraint::IsNotTop(function));
        if !is_function {
            return;
        }

        match info {
            Info::FunctionEnter {
                base_tmp,
                args_tmps,
                ..
            } => {
                let mut env = self.env;
                let inputs =
                    self.lattice
                        .call_inputs(&mut env, self.inferred, function_tmp, *base_tmp, args_tmps);
                let matched = self
                    .lattice
                    .match_call(&inputs.callee, inputs.base, &inputs.args, false);
                let mut allowed: Vec<TupleId> = matched.matches.iter().map(|m| m.result).collect();
                if matched.is_top {
                    allowed.push(TupleId::TOP);
                }
                self.allowed_returns.push(allowed);
            }
            Info::FunctionInvocation {
                base_tmp,
                args_tmps,
                is_constructor_call,
                ..
            } => {
                let mut env = self.env;
                let inputs =
                    self.lattice
                        .call_inputs(&mut env, self.inferred, function_tmp, *base_tmp, args_tmps);
                let receiver = self.lattice.pool().tuple(inputs.base);
                // Constructing abstract objects is fine.
                if self.config.sjs_checks && receiver.is_object() && !*is_constructor_call {
                    let object = receiver.object;
                    self.error(site, &Constraint::IsNotAbstractReceiver(object));
                }
                let matched = self.lattice.match_call(
                    &inputs.callee,
                    inputs.base,
                    &inputs.args,
                    *is_constructor_call,
                );
                self.error(
                    site,
                    &Constraint::NonToppyCall {
                        callee: inputs.callee.clone(),
                        enabled: self.config.toppy_checks,
                    },
                );
                self.error(
                    site,
                    &Constraint::IsSuccessfulCall {
                        args: inputs.args.to_vec(),
                        matches: matched.matches.len(),
                        is_top: matched.is_top,
                        callee: inputs.callee.clone(),
                    },
                );
                self.warning(site, &Constraint::IsNotTopFunction(inputs.callee));
            }
            Info::FunctionReturn { result_tmp, .. } => {
                // A return without a checked entry has nothing to match.
                let Some(allowed) = self.allowed_returns.pop() else {
                    return;
                };
                let returned = self.env.get(*result_tmp);
                self.error(
                    site,
                    &Constraint::NonToppyReturn {
                        allowed: allowed.clone(),
                        enabled: self.config.toppy_checks,
                    },
                );
                self.error(site, &Constraint::IsSuccessfulReturn { returned, allowed });
            }
            _ => {}
        }
    }
}
