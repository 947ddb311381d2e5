//! Evaluation settings.

/// Default bound on nested scripted calls.
#[cfg(not(target_arch = "wasm32"))]
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// WASM stacks are small and cannot grow.
#[cfg(target_arch = "wasm32")]
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Settings of one evaluation context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Require declared types for variables, parameters, return types and
    /// catch parameters; reject reads and writes of undeclared names.
    pub strict_java: bool,
    /// Maximum number of nested scripted method activations; `None` is unbounded.
    pub max_call_depth: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            strict_java: false,
            max_call_depth: Some(DEFAULT_MAX_CALL_DEPTH),
        }
    }
}
