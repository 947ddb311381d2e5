//! Evaluator tests that run whole statement trees.
//!
//! Trees are built with [`AstBuilder`] and evaluated against a
//! [`BasicHost`], so `print` output and generated classes can be inspected.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

mod declarations_tests;
mod expressions_tests;

use std::sync::Arc;

use crate::errors::{EvalError, EvalErrorKind, EvalResult};
use crate::host::BasicHost;
use crate::interpreter::{Interpreter, InterpreterBuilder};
use crate::runtime::SharedRuntime;
use crate::value::Value;
use crate::EvalConfig;
use zoola_ir::{AstBuilder, NodeId, SharedInterner};

/// An interpreter over a [`BasicHost`] that runs builder-made units.
pub(crate) struct Script {
    pub interp: Interpreter,
    pub host: Arc<BasicHost>,
    interner: SharedInterner,
}

impl Script {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn strict() -> Self {
        Self::with_config(EvalConfig {
            strict_java: true,
            ..EvalConfig::default()
        })
    }

    pub fn with_config(config: EvalConfig) -> Self {
        crate::init_tracing();
        let interner = SharedInterner::new();
        let host = Arc::new(BasicHost::new());
        let interp = InterpreterBuilder::new()
            .config(config)
            .interner(interner.clone())
            .host(host.clone())
            .class_generator(host.clone())
            .build();
        Script {
            interp,
            host,
            interner,
        }
    }

    /// Another context over the same runtime.
    pub fn sibling(&self) -> Interpreter {
        InterpreterBuilder::new()
            .shared(self.runtime())
            .build()
    }

    pub fn runtime(&self) -> SharedRuntime {
        self.interp.runtime().clone()
    }

    pub fn builder(&self) -> AstBuilder {
        AstBuilder::new(self.interner.clone())
    }

    /// Run the statements `build` returns as one top-level unit.
    pub fn run(&mut self, build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> EvalResult {
        let mut b = self.builder();
        let stmts = build(&mut b);
        let root = b.block(stmts);
        let tree = b.finish(root);
        self.interp.eval(&tree)
    }

    /// Like [`run`](Self::run) but the unit must succeed.
    pub fn ok(&mut self, build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Value {
        match self.run(build) {
            Ok(value) => value,
            Err(err) => panic!("unit failed: {err}"),
        }
    }

    /// Like [`run`](Self::run) but the unit must fail.
    pub fn fault(&mut self, build: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> EvalError {
        match self.run(build) {
            Ok(value) => panic!("expected a fault, unit yielded {value}"),
            Err(err) => err,
        }
    }

    /// Current value of a variable; `Void` when undefined.
    pub fn get(&self, name: &str) -> Value {
        self.interp.get_variable(name).unwrap().unwrap_or(Value::Void)
    }
}

/// Class name of the exception carried by a target fault.
pub(crate) fn thrown_class(err: &EvalError) -> String {
    match &err.kind {
        EvalErrorKind::Thrown(value) => value.type_name(),
        other => panic!("expected a thrown fault, got {other}"),
    }
}
