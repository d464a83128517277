//! Precision policy of a replay.

/// What a call-stack abstraction keys activations by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sensitivity {
    /// The chain of call sites.
    CallSite,
    /// The chain of (call site, parameter types).
    ParameterValues,
    /// The instantiation of a generic callee's type parameter.
    GenericParameterInstantiations,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CallstackSensitivity {
    pub sensitivity: Sensitivity,
    /// Frames kept; `None` keeps the whole stack.
    pub height: Option<usize>,
}

/// How precisely variables are tracked across program points and calls.
///
/// The default is fully flow- and context-sensitive: every concrete
/// variable is strongly updated and one replay round suffices.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PrecisionConfig {
    /// Named variables keep one type for the whole run.
    pub flow_insensitive: bool,
    /// Temporaries of all activations of a function share one type.
    pub context_insensitive: bool,
    pub callstack: Option<CallstackSensitivity>,
}

impl PrecisionConfig {
    #[must_use]
    pub fn with_flow_insensitive(mut self) -> Self {
        self.flow_insensitive = true;
        self
    }

    #[must_use]
    pub fn with_context_insensitive(mut self) -> Self {
        self.context_insensitive = true;
        self
    }

    #[must_use]
    pub fn with_callstack(mut self, sensitivity: Sensitivity, height: Option<usize>) -> Self {
        self.callstack = Some(CallstackSensitivity {
            sensitivity,
            height,
        });
        self
    }

    /// Whether any setting merges concrete variables, requiring a fixpoint.
    pub fn merges_variables(&self) -> bool {
        self.flow_insensitive || self.context_insensitive || self.callstack.is_some()
    }

    /// Whether writes to a variable join into the stored type.
    pub fn is_weak_update(&self, named: bool, force_merge: bool) -> bool {
        (self.flow_insensitive && named)
            || ((self.context_insensitive || self.callstack.is_some()) && !named)
            || force_merge
    }

    /// The configurations the evaluation harness compares.
    pub fn presets() -> Vec<PrecisionConfig> {
        let base = PrecisionConfig::default();
        let mut presets = vec![
            base,
            base.with_flow_insensitive(),
            base.with_context_insensitive(),
            base.with_flow_insensitive().with_context_insensitive(),
        ];
        for sensitivity in [
            Sensitivity::CallSite,
            Sensitivity::ParameterValues,
            Sensitivity::GenericParameterInstantiations,
        ] {
            presets.push(base.with_callstack(sensitivity, Some(1)));
            presets.push(base.with_flow_insensitive().with_callstack(sensitivity, None));
        }
        presets
    }
}
