//! Statement rules: blocks, conditionals, loops, `switch`, `synchronized`.
//!
//! Loop bodies report through [`Completion::after_loop_body`] and `switch`
//! through [`Completion::after_switch`], so which signals each construct
//! absorbs is decided in one place.

use std::sync::Arc;

use super::Interpreter;
use crate::coercion::{convert, Conversion};
use crate::completion::{Completion, ExecResult, LoopStep};
use crate::errors::{strict, void_operand, EvalError, EvalErrorKind};
use crate::operators::primitive_equals;
use crate::scope::ScopeId;
use crate::value::{TypeRef, Value};
use zoola_ir::{FormalParam, Modifiers, Name, NodeId, NodeKind, SwitchCase};

impl Interpreter {
    /// `{ ... }` in a fresh block scope.
    pub(super) fn exec_block(&mut self, stmts: &[NodeId]) -> ExecResult {
        self.with_block_scope(|scoped| scoped.run_statements(stmts))
    }

    /// Run statements in the innermost scope. Class declarations go first.
    /// Yields the last statement's completion, or the first signal.
    pub(super) fn run_statements(&mut self, stmts: &[NodeId]) -> ExecResult {
        let tree = Arc::clone(&self.tree);
        let is_class = |id: &NodeId| {
            matches!(tree.get(*id).map(|n| &n.kind), Some(NodeKind::ClassDecl(_)))
        };
        let classes = stmts.iter().filter(|id| is_class(id));
        let rest = stmts.iter().filter(|id| !is_class(id));
        let mut last = Completion::void();
        for &stmt in classes.chain(rest) {
            last = self.exec(stmt)?;
            if last.is_signal() {
                break;
            }
        }
        Ok(last)
    }

    pub(super) fn exec_if(
        &mut self,
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> ExecResult {
        let branch = if self.eval_condition(cond)? {
            Some(then_branch)
        } else {
            else_branch
        };
        match branch {
            Some(branch) => Ok(only_signal(self.exec(branch)?)),
            None => Ok(Completion::void()),
        }
    }

    pub(super) fn exec_while(&mut self, cond: NodeId, body: Option<NodeId>) -> ExecResult {
        while self.eval_condition(cond)? {
            if let LoopStep::Exit(exit) = self.loop_body(body)? {
                return Ok(exit);
            }
        }
        Ok(Completion::void())
    }

    pub(super) fn exec_do_while(&mut self, body: NodeId, cond: NodeId) -> ExecResult {
        loop {
            if let LoopStep::Exit(exit) = self.loop_body(Some(body))? {
                return Ok(exit);
            }
            if !self.eval_condition(cond)? {
                return Ok(Completion::void());
            }
        }
    }

    /// `for (init; cond; update) body`. The init clause gets one scope for
    /// the whole loop.
    pub(super) fn exec_for(
        &mut self,
        init: &[NodeId],
        cond: Option<NodeId>,
        update: &[NodeId],
        body: Option<NodeId>,
    ) -> ExecResult {
        self.with_block_scope(|scoped| {
            for &stmt in init {
                scoped.exec(stmt)?;
            }
            loop {
                if let Some(cond) = cond {
                    if !scoped.eval_condition(cond)? {
                        return Ok(Completion::void());
                    }
                }
                if let LoopStep::Exit(exit) = scoped.loop_body(body)? {
                    return Ok(exit);
                }
                for &step in update {
                    scoped.exec(step)?;
                }
            }
        })
    }

    /// `for (T x : source) body`. Each element gets a fresh scope.
    pub(super) fn exec_for_each(
        &mut self,
        var: &FormalParam,
        iterable: NodeId,
        body: Option<NodeId>,
    ) -> ExecResult {
        let source = self.eval_expr(iterable)?;
        if source.is_null() {
            return Err(EvalErrorKind::NullIteration.into());
        }
        let declared = var.ty.as_ref().map(|ty| self.resolve_type(ty)).transpose()?;
        if declared.is_none() && self.config.strict_java {
            return Err(strict(format!(
                "undeclared type of loop variable '{}'",
                self.text(var.name)
            )));
        }
        let cursor = self.runtime.iterables.cursor(&source).ok_or_else(|| {
            EvalError::from(EvalErrorKind::NotIterable {
                type_name: source.type_name(),
            })
        })?;
        for element in cursor {
            let element = if element.is_void() { Value::Null } else { element };
            let completion = self.with_block_scope(|scoped| {
                let scope = scoped.scope();
                scoped.bind_loop_variable(scope, var.name, declared.as_ref(), element)?;
                match body {
                    Some(body) => scoped.exec(body),
                    None => Ok(Completion::void()),
                }
            })?;
            if let LoopStep::Exit(exit) = completion.after_loop_body() {
                return Ok(exit);
            }
        }
        Ok(Completion::void())
    }

    fn bind_loop_variable(
        &mut self,
        scope: ScopeId,
        name: Name,
        declared: Option<&TypeRef>,
        element: Value,
    ) -> Result<(), EvalError> {
        let display = self.text(name);
        match declared {
            Some(ty) => {
                let value = convert(
                    &*self.runtime.host,
                    &element,
                    ty,
                    Conversion::Assignment,
                    &format!("loop variable '{display}'"),
                )?;
                self.scopes
                    .declare_typed(scope, name, ty.clone(), Modifiers::empty(), value, display)
            }
            None => self.scopes.define_untyped(scope, name, element),
        }
    }

    fn loop_body(&mut self, body: Option<NodeId>) -> Result<LoopStep, EvalError> {
        match body {
            Some(body) => Ok(self.exec(body)?.after_loop_body()),
            None => Ok(LoopStep::Next),
        }
    }

    /// `switch`: first equal label, else `default`, then fall through.
    /// The case bodies share one block scope.
    pub(super) fn exec_switch(&mut self, selector: NodeId, cases: &[SwitchCase]) -> ExecResult {
        if cases.is_empty() {
            return Err(EvalErrorKind::EmptySwitch.into());
        }
        let value = self.eval_expr(selector)?;
        if value.is_void() {
            return Err(void_operand("switch"));
        }
        self.with_block_scope(|scoped| {
            let mut start = None;
            for (position, case) in cases.iter().enumerate() {
                if let Some(label) = case.label {
                    let label = scoped.eval_expr(label)?;
                    if labels_match(&value, &label) {
                        start = Some(position);
                        break;
                    }
                }
            }
            let Some(start) = start.or_else(|| cases.iter().position(|c| c.label.is_none()))
            else {
                return Ok(Completion::void());
            };
            for case in &cases[start..] {
                for &stmt in &case.body {
                    let completion = scoped.exec(stmt)?;
                    if completion.is_signal() {
                        return Ok(completion.after_switch());
                    }
                }
            }
            Ok(Completion::void())
        })
    }

    /// `synchronized (monitor) body`.
    pub(super) fn exec_synchronized(&mut self, monitor: NodeId, body: NodeId) -> ExecResult {
        let monitor = self.eval_expr(monitor)?;
        let monitors = Arc::clone(&self.runtime.monitors);
        monitors.synchronized(&monitor, || self.exec(body))?
    }
}

/// Statements other than blocks complete with `void` unless they signal.
fn only_signal(completion: Completion) -> Completion {
    if completion.is_signal() {
        completion
    } else {
        Completion::void()
    }
}

/// Case label equality: primitives by value, strings by content, anything
/// else by identity.
fn labels_match(selector: &Value, label: &Value) -> bool {
    if let (Some(a), Some(b)) = (selector.as_str(), label.as_str()) {
        return a == b;
    }
    match (selector.unboxed(), label.unboxed()) {
        // A boolean label never matches a numeric selector.
        (Some(a), Some(b)) => primitive_equals(a, b).unwrap_or(false),
        _ => selector.identity_eq(label),
    }
}
