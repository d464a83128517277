//! Human-readable rendering of types.
//!
//! Tuples print their non-Bottom slots, parenthesized when more than one
//! kind is present. A tuple reached again while it is being printed is
//! named `TypeN`, and its outermost occurrence is suffixed `as TypeN`.
//! Objects nested more than two levels deep print as `...` unless the
//! formatter is verbose.

use rustc_hash::{FxHashMap, FxHashSet};
use tt_stack::ensure_sufficient_stack;

use crate::field::ARRAY_FIELD;
use crate::kinds::{Flat, RecursiveRef, TypeParam};
use crate::object::{FunctionType, ObjectData, SingleFunction};
use crate::pool::TypePool;
use crate::{ObjectId, TupleId};

pub const TOP_SYMBOL: &str = "⊤";
pub const BOTTOM_SYMBOL: &str = "⊥";

/// Built-in members that clutter object listings.
const IGNORED_PROPERTIES: &[&str] = &[
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "apply",
    "bind",
    "call",
    "constructor",
    "getOwnPropertyNames",
    "hasOwnProperty",
    "isPrototypeOf",
    "length",
    "name",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
];

const GLOBAL_MARKERS: &[&str] = &[
    "Math", "Function", "Object", "JSON", "Number", "String", "RegExp", "Error", "Boolean",
    "isNaN", "eval",
];

/// Objects with more properties list only their names.
const MAX_LISTED_PROPERTIES: usize = 10;

const MAX_OBJECT_DEPTH: usize = 2;

pub struct TypeFormatter<'p> {
    pool: &'p TypePool,
    verbose: bool,
    on_stack: FxHashSet<TupleId>,
    recursive_names: FxHashMap<TupleId, usize>,
}

impl<'p> TypeFormatter<'p> {
    pub fn new(pool: &'p TypePool) -> Self {
        Self {
            pool,
            verbose: false,
            on_stack: FxHashSet::default(),
            recursive_names: FxHashMap::default(),
        }
    }

    /// No depth limit, no abbreviated intersections or property lists.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn tuple(&mut self, tuple: TupleId) -> String {
        let mut buf = String::new();
        self.tuple_into(tuple, 0, &mut buf);
        buf
    }

    pub fn function(&mut self, function: &FunctionType) -> String {
        let mut buf = String::new();
        self.function_into(function, 0, &mut buf);
        buf
    }

    fn recursive_name(&mut self, tuple: TupleId) -> String {
        let next = self.recursive_names.len();
        let n = *self.recursive_names.entry(tuple).or_insert(next);
        format!("Type{n}")
    }

    fn tuple_into(&mut self, tuple: TupleId, depth: usize, buf: &mut String) {
        if self.on_stack.contains(&tuple) {
            let name = self.recursive_name(tuple);
            buf.push_str(&name);
            return;
        }
        self.on_stack.insert(tuple);
        ensure_sufficient_stack(|| self.slots_into(tuple, depth, buf));
        if self.recursive_names.contains_key(&tuple) {
            let name = self.recursive_name(tuple);
            buf.push_str(" as ");
            buf.push_str(&name);
        }
        self.on_stack.remove(&tuple);
    }

    fn slots_into(&mut self, tuple: TupleId, depth: usize, buf: &mut String) {
        match tuple {
            TupleId::TOP => {
                buf.push_str(TOP_SYMBOL);
                return;
            }
            TupleId::BOTTOM => {
                buf.push_str(BOTTOM_SYMBOL);
                return;
            }
            _ => {}
        }
        let data = self.pool.tuple(tuple).clone();
        let mut parts: Vec<String> = Vec::new();
        if data.is_object() {
            parts.push(self.object(data.object, depth));
        }
        for (flat, label) in [
            (data.null, "Null"),
            (data.string, "String"),
            (data.number, "Number"),
            (data.boolean, "Boolean"),
            (data.undefined, "Undefined"),
        ] {
            if flat == Flat::Top {
                parts.push(label.to_owned());
            }
        }
        match &data.recursive {
            RecursiveRef::Bottom => {}
            RecursiveRef::Top => parts.push(format!("RecursiveReference_{TOP_SYMBOL}")),
            RecursiveRef::Some(ids) => {
                let ids: Vec<String> = ids.iter().map(u32::to_string).collect();
                parts.push(format!("RecursiveReference({})", ids.join(", ")));
            }
        }
        if data.object_top_due_to_recursion == Flat::Top {
            parts.push("ObjectTopDueToRecursion".to_owned());
        }
        match data.type_param {
            TypeParam::Bottom => {}
            TypeParam::Top => parts.push(format!("TypeParameter_{TOP_SYMBOL}")),
            TypeParam::Named(name) => parts.push(self.pool.interner().lookup(name).to_owned()),
        }
        match parts.len() {
            0 => buf.push_str(BOTTOM_SYMBOL),
            1 => buf.push_str(&parts[0]),
            _ => {
                buf.push('(');
                buf.push_str(&parts.join(","));
                buf.push(')');
            }
        }
    }

    fn object(&mut self, object: ObjectId, depth: usize) -> String {
        if object == ObjectId::TOP {
            return format!("Object_{TOP_SYMBOL}");
        }
        if !self.verbose && depth > MAX_OBJECT_DEPTH {
            return "...".to_owned();
        }
        let pool = self.pool;
        let data = pool.object(object);
        if let Some(short) = self.short_name(data, depth) {
            return short;
        }
        if !matches!(data.function, FunctionType::Bottom | FunctionType::Top) {
            let mut buf = String::from("<");
            self.function_into(&data.function, depth, &mut buf);
            buf.push('>');
            return buf;
        }

        let interner = pool.interner();
        let mut names: Vec<(&str, TupleId)> = data
            .properties
            .iter()
            .map(|(&name, &ty)| (interner.lookup(name), ty))
            .filter(|(name, _)| self.verbose || !IGNORED_PROPERTIES.contains(name))
            .collect();
        names.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut buf = String::from("{");
        if !self.verbose && names.len() > MAX_LISTED_PROPERTIES {
            let listed: Vec<&str> = names.iter().map(|(name, _)| *name).collect();
            buf.push_str(&listed.join(", "));
        } else {
            for (i, (name, ty)) in names.into_iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                buf.push_str(name);
                buf.push_str(": ");
                self.tuple_into(ty, depth + 1, &mut buf);
            }
        }
        buf.push('}');
        buf
    }

    fn short_name(&mut self, data: &ObjectData, depth: usize) -> Option<String> {
        let pool = self.pool;
        let interner = pool.interner();
        let has = |name: &str| data.property(interner.intern(name)).is_some();
        if GLOBAL_MARKERS.iter().all(|name| has(name)) {
            return Some("~global".to_owned());
        }
        let elements = data.property(interner.intern(ARRAY_FIELD))?;
        let mut buf = String::from("~Array<");
        self.tuple_into(elements, depth + 1, &mut buf);
        buf.push('>');
        Some(buf)
    }

    fn function_into(&mut self, function: &FunctionType, depth: usize, buf: &mut String) {
        match function {
            FunctionType::Bottom => {
                buf.push_str(BOTTOM_SYMBOL);
                buf.push_str(" -> ");
                buf.push_str(BOTTOM_SYMBOL);
            }
            FunctionType::Top => {
                buf.push_str(TOP_SYMBOL);
                buf.push_str(" -> ");
                buf.push_str(TOP_SYMBOL);
            }
            FunctionType::Single(single) => self.single_into(single, depth, buf),
            FunctionType::Intersection(members) => {
                buf.push_str("I(");
                if members.len() > 1 && !self.verbose {
                    buf.push('x');
                    buf.push_str(&members.len().to_string());
                } else {
                    for (i, member) in members.iter().enumerate() {
                        if i > 0 {
                            buf.push_str(", ");
                        }
                        self.single_into(member, depth, buf);
                    }
                }
                buf.push(')');
            }
        }
    }

    fn single_into(&mut self, single: &SingleFunction, depth: usize, buf: &mut String) {
        buf.push('(');
        for (i, &arg) in single.args.iter().enumerate() {
            if i > 0 {
                buf.push_str(", ");
            }
            self.tuple_into(arg, depth + 1, buf);
        }
        buf.push_str(") -> ");
        self.tuple_into(single.result, depth + 1, buf);
        buf.push_str(" @ ");
        self.tuple_into(single.base, depth + 1, buf);
    }
}

impl TypePool {
    /// Render a tuple with the default depth limit.
    pub fn format_tuple(&self, tuple: TupleId) -> String {
        TypeFormatter::new(self).tuple(tuple)
    }

    pub fn format_function(&self, function: &FunctionType) -> String {
        TypeFormatter::new(self).function(function)
    }
}
