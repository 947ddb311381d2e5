//! Tree-walking evaluator.
//!
//! # Architecture
//!
//! Every node goes through [`Interpreter::exec`], an exhaustive `match` on
//! [`NodeKind`]. Expressions complete with [`Completion::Normal`]; `return`,
//! `break` and `continue` complete with [`Completion::Signal`] and travel
//! up as ordinary results until the construct that absorbs them.
//!
//! The rules live in sibling modules:
//!
//! - `expr`: literals, operators, assignment, casts, allocation
//! - `names`: identifiers, qualified names, member access, left values
//! - `calls`: method invocation, scripted method activation
//! - `control`: blocks, conditionals, loops, `switch`, `synchronized`
//! - `exceptions`: `throw` and the try/catch/finally state machine
//! - `decl`: variable, method and class declarations, arrays
//!
//! # Arena threading
//!
//! A [`NodeId`] is only valid in the arena it came from. Scripted methods
//! carry the arena of their declaration; invoking one switches
//! `Interpreter::tree` to that arena for the duration of the call and the
//! frame guard switches it back.
//!
//! # Faults
//!
//! A fault is located at the innermost node it passes: span, node id and a
//! backtrace of the call stack at that moment. Integer division by zero is
//! turned into a thrown `ArithmeticException` at the same point, so `catch`
//! sees it like any other exception.

mod builder;
mod calls;
mod control;
mod decl;
mod exceptions;
mod expr;
mod names;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use crate::call_stack::CallStack;
use crate::coercion::{convert, Conversion};
use crate::completion::{Completion, ExecResult, SignalKind};
use crate::config::EvalConfig;
use crate::errors::{internal, EvalError, EvalErrorKind, EvalResult};
use crate::lvalue::{LeftValue, LvalueEnv};
use crate::runtime::SharedRuntime;
use crate::scope::ScopeArena;
use crate::stack::ensure_sufficient_stack;
use crate::value::{names as type_names, TypeRef, Value};
use std::sync::Arc;
use zoola_ir::{Modifiers, Name, NodeArena, NodeId, NodeKind, SyntaxTree};

/// Names the evaluator compares against on hot paths, interned once.
#[derive(Clone, Copy, Debug)]
pub(crate) struct InternedNames {
    pub(crate) length: Name,
}

impl InternedNames {
    fn new(runtime: &SharedRuntime) -> Self {
        InternedNames {
            length: runtime.interner.intern("length"),
        }
    }
}

/// One evaluation context: a scope arena, a call stack and the runtime it
/// shares with other contexts.
pub struct Interpreter {
    pub(crate) runtime: SharedRuntime,
    pub(crate) config: EvalConfig,
    pub(crate) scopes: ScopeArena,
    pub(crate) call_stack: CallStack,
    /// Arena the node ids currently being evaluated belong to.
    pub(crate) tree: Arc<NodeArena>,
    pub(crate) names: InternedNames,
}

impl Interpreter {
    /// Context with default settings over `runtime`.
    pub fn new(runtime: SharedRuntime) -> Self {
        Self::with_config(runtime, EvalConfig::default())
    }

    pub fn with_config(runtime: SharedRuntime, config: EvalConfig) -> Self {
        let scopes = ScopeArena::new();
        let call_stack = CallStack::new(scopes.global(), config.max_call_depth);
        let names = InternedNames::new(&runtime);
        Interpreter {
            runtime,
            config,
            scopes,
            call_stack,
            tree: Arc::new(NodeArena::new()),
            names,
        }
    }

    pub fn runtime(&self) -> &SharedRuntime {
        &self.runtime
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// Evaluate a top-level unit.
    ///
    /// A root block runs in place, so its declarations land in the current
    /// scope and stay visible to later units. A `return` ends the unit with
    /// its value; `break`/`continue` escaping the unit are faults. After a
    /// fault the call stack is back at the depth it had on entry.
    pub fn eval(&mut self, tree: &SyntaxTree) -> EvalResult {
        let previous = std::mem::replace(&mut self.tree, Arc::clone(&tree.arena));
        let depth = self.call_stack.depth();
        let result = self
            .exec_unit(tree.root)
            .and_then(Completion::at_unit_boundary);
        if result.is_err() {
            let popped = self.call_stack.truncate(depth);
            if popped > 0 {
                tracing::debug!(popped, "call stack truncated after fault");
            }
        }
        self.tree = previous;
        result
    }

    fn exec_unit(&mut self, root: NodeId) -> ExecResult {
        let tree = Arc::clone(&self.tree);
        match tree.get(root).map(|node| &node.kind) {
            Some(NodeKind::Block(stmts)) => self.run_statements(stmts),
            Some(_) => self.exec(root),
            None => Err(missing_node(root)),
        }
    }

    /// Value of a variable visible from the innermost scope.
    pub fn get_variable(&self, name: &str) -> Result<Option<Value>, EvalError> {
        let name = self.runtime.interner.intern(name);
        Ok(self
            .scopes
            .lookup(self.call_stack.top(), name)?
            .map(|slot| slot.value.clone()))
    }

    /// Untyped assignment from the innermost scope, declaring on first write.
    pub fn set_variable(&mut self, name: &str, value: Value) -> EvalResult {
        let name = self.runtime.interner.intern(name);
        let lv = LeftValue::Variable {
            scope: self.call_stack.top(),
            name,
        };
        self.assign_left_value(&lv, value)
    }

    /// Declare a typed variable in the innermost scope.
    pub fn declare_variable(&mut self, name: &str, ty: TypeRef, value: Value) -> Result<(), EvalError> {
        let value = convert(
            &*self.runtime.host,
            &value,
            &ty,
            Conversion::Assignment,
            "Typed variable declaration",
        )?;
        let interned = self.runtime.interner.intern(name);
        let scope = self.call_stack.top();
        self.scopes
            .declare_typed(scope, interned, ty, Modifiers::empty(), value, name)
    }

    /// Call a scripted method visible from the innermost scope.
    pub fn invoke_method(&mut self, name: &str, args: Vec<Value>) -> EvalResult {
        let interned = self.runtime.interner.intern(name);
        let method = self
            .scopes
            .lookup_method(self.call_stack.top(), interned)?
            .ok_or_else(|| {
                EvalError::from(EvalErrorKind::UndefinedMethod {
                    signature: format!("{name}/{}", args.len()),
                })
            })?;
        self.invoke_script(&method, args, None)
    }

    /// Evaluate one node.
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn exec(&mut self, id: NodeId) -> ExecResult {
        let tree = Arc::clone(&self.tree);
        let Some(node) = tree.get(id) else {
            return Err(missing_node(id));
        };
        ensure_sufficient_stack(|| self.exec_kind(id, &node.kind))
            .map_err(|err| self.locate(err, id, node.span))
    }

    fn exec_kind(&mut self, id: NodeId, kind: &NodeKind) -> ExecResult {
        let value = match kind {
            NodeKind::Literal(lit) => self.eval_literal(*lit),
            NodeKind::Ident(name) => self.eval_ident(*name),
            NodeKind::QualifiedName(segments) => self.eval_qualified(segments),
            NodeKind::ClassLiteral(ty) => self.resolve_type(ty).map(Value::Type),
            NodeKind::FieldAccess { target, field } => self.eval_field_access(*target, *field),
            NodeKind::Index { target, index } => self.eval_index(*target, *index),
            NodeKind::Property { target, key } => self.eval_property(*target, *key),
            NodeKind::MethodCall { target, name, args } => {
                self.eval_method_call(id, *target, *name, args)
            }
            NodeKind::New { ty, args } => self.eval_new(ty, args),
            NodeKind::NewArray { element, dims } => self.eval_new_array(element, dims),
            NodeKind::ArrayInit(_) => Err(EvalErrorKind::InitializerLocation { position: 0 }.into()),
            NodeKind::Cast { ty, expr } => self.eval_cast(ty, *expr),
            NodeKind::InstanceOf { expr, ty } => self.eval_instance_of(*expr, ty),
            NodeKind::Unary {
                op,
                operand,
                postfix,
            } => self.eval_unary(*op, *operand, *postfix),
            NodeKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => self.eval_ternary(*cond, *then_expr, *else_expr),
            NodeKind::Assign { op, target, value } => self.eval_assign(*op, *target, *value),

            NodeKind::Block(stmts) => return self.exec_block(stmts),
            NodeKind::Synchronized { monitor, body } => {
                return self.exec_synchronized(*monitor, *body)
            }
            NodeKind::VarDecl(decl) => self.exec_var_decl(decl),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => return self.exec_if(*cond, *then_branch, *else_branch),
            NodeKind::While { cond, body } => return self.exec_while(*cond, *body),
            NodeKind::DoWhile { body, cond } => return self.exec_do_while(*body, *cond),
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => return self.exec_for(init, *cond, update, *body),
            NodeKind::ForEach {
                var,
                iterable,
                body,
            } => return self.exec_for_each(var, *iterable, *body),
            NodeKind::Switch { selector, cases } => return self.exec_switch(*selector, cases),
            NodeKind::Return(value) => {
                let payload = match value {
                    Some(expr) => self.eval_expr(*expr)?,
                    None => Value::Void,
                };
                return Ok(Completion::signal(SignalKind::Return, payload, id));
            }
            NodeKind::Break => return Ok(Completion::signal(SignalKind::Break, Value::Void, id)),
            NodeKind::Continue => {
                return Ok(Completion::signal(SignalKind::Continue, Value::Void, id))
            }
            NodeKind::Throw(value) => self.exec_throw(*value),
            NodeKind::Try {
                body,
                catches,
                finally,
            } => return self.exec_try(*body, catches, *finally),
            NodeKind::MethodDecl(decl) => self.exec_method_decl(decl),
            NodeKind::ClassDecl(decl) => self.exec_class_decl(id, decl),
            NodeKind::Empty => Ok(Value::Void),
        };
        value.map(Completion::Normal)
    }

    /// Evaluate an expression node to a value.
    pub(crate) fn eval_expr(&mut self, id: NodeId) -> EvalResult {
        match self.exec(id)? {
            Completion::Normal(value) => Ok(value),
            Completion::Signal(signal) => Err(internal(format!(
                "'{}' completed an expression",
                signal.kind.keyword()
            ))),
        }
    }

    /// Boolean value of a condition.
    pub(crate) fn eval_condition(&mut self, id: NodeId) -> Result<bool, EvalError> {
        let value = self.eval_expr(id)?;
        if value.is_void() {
            return Err(EvalErrorKind::ConditionVoid.into());
        }
        value.as_bool().ok_or_else(|| {
            EvalErrorKind::ConditionNotBoolean {
                found: value.type_name(),
            }
            .into()
        })
    }

    pub(crate) fn lvalue_env(&mut self) -> LvalueEnv<'_> {
        LvalueEnv {
            scopes: &mut self.scopes,
            host: &*self.runtime.host,
            interner: &self.runtime.interner,
        }
    }

    pub(crate) fn read_left_value(&mut self, lv: &LeftValue) -> EvalResult {
        lv.get(&self.lvalue_env())
    }

    pub(crate) fn assign_left_value(&mut self, lv: &LeftValue, value: Value) -> EvalResult {
        let strict = self.config.strict_java;
        lv.assign(&mut self.lvalue_env(), value, strict)
    }

    pub(crate) fn text(&self, name: Name) -> &'static str {
        self.runtime.interner.lookup(name)
    }

    /// Attach position and backtrace to a fault leaving `id`.
    #[cold]
    fn locate(&self, mut err: EvalError, id: NodeId, span: zoola_ir::Span) -> EvalError {
        if let EvalErrorKind::Arithmetic { message } = &err.kind {
            let exception = self
                .runtime
                .host
                .new_exception(type_names::ARITHMETIC_EXCEPTION, message);
            err.kind = EvalErrorKind::Thrown(exception);
        }
        if err.backtrace.is_none() {
            err = err.with_backtrace(self.call_stack.capture(&self.runtime.interner));
        }
        err.at(id, span)
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("depth", &self.call_stack.depth())
            .field("live_scopes", &self.scopes.live_count())
            .finish_non_exhaustive()
    }
}

#[cold]
fn missing_node(id: NodeId) -> EvalError {
    internal(format!("node {} is not in the current arena", id.index()))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
