//! `InterpreterBuilder` for creating evaluation contexts.

use std::sync::Arc;

use super::Interpreter;
use crate::config::EvalConfig;
use crate::host::{
    BasicHost, ClassGenerator, HostResolver, IterableAdapter, NoClassGenerator,
};
use crate::runtime::SharedRuntime;
use zoola_ir::SharedInterner;

/// Builder for [`Interpreter`].
///
/// Contexts that should share monitors, generated classes and literal
/// identity are built from one [`SharedRuntime`] via [`shared`](Self::shared).
/// Otherwise the builder assembles a fresh runtime; without a host it uses a
/// [`BasicHost`] as both resolver and class generator.
#[derive(Default)]
pub struct InterpreterBuilder {
    config: EvalConfig,
    runtime: Option<SharedRuntime>,
    interner: Option<SharedInterner>,
    host: Option<Arc<dyn HostResolver>>,
    iterables: Option<Arc<dyn IterableAdapter>>,
    classes: Option<Arc<dyn ClassGenerator>>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable strict-Java mode.
    #[must_use]
    pub fn strict_java(mut self, strict: bool) -> Self {
        self.config.strict_java = strict;
        self
    }

    /// Bound nested scripted calls; `None` removes the bound.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Join an existing runtime. Overrides the collaborator setters.
    #[must_use]
    pub fn shared(mut self, runtime: SharedRuntime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    #[must_use]
    pub fn host(mut self, host: Arc<dyn HostResolver>) -> Self {
        self.host = Some(host);
        self
    }

    #[must_use]
    pub fn iterables(mut self, iterables: Arc<dyn IterableAdapter>) -> Self {
        self.iterables = Some(iterables);
        self
    }

    #[must_use]
    pub fn class_generator(mut self, classes: Arc<dyn ClassGenerator>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn build(self) -> Interpreter {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => {
                let interner = self.interner.unwrap_or_default();
                let mut runtime = match (self.host, self.classes) {
                    (Some(host), classes) => SharedRuntime::new(
                        interner,
                        host,
                        classes.unwrap_or_else(|| Arc::new(NoClassGenerator)),
                    ),
                    (None, Some(classes)) => {
                        SharedRuntime::new(interner, Arc::new(BasicHost::new()), classes)
                    }
                    (None, None) => SharedRuntime::with_basic_host(interner),
                };
                if let Some(iterables) = self.iterables {
                    runtime.iterables = iterables;
                }
                runtime
            }
        };
        tracing::debug!(
            strict_java = self.config.strict_java,
            max_call_depth = ?self.config.max_call_depth,
            "interpreter built"
        );
        Interpreter::with_config(runtime, self.config)
    }
}
