//! Method invocation.
//!
//! An unqualified call `name(args)` tries, in order: a scripted method
//! visible from the innermost scope, a variable holding a callable, then a
//! host command. A qualified call resolves `name` on the evaluated receiver
//! through the host.

use std::sync::Arc;

use super::scope_guard::FrameGuard;
use super::Interpreter;
use crate::coercion::{convert, Conversion};
use crate::completion::Completion;
use crate::errors::{type_mismatch, EvalError, EvalErrorKind, EvalResult, HostError};
use crate::scope::{ScopeId, ScopeKind};
use crate::value::{BoundMethod, Callable, ReturnType, ScriptMethod, Value};
use zoola_ir::{Modifiers, Name, NodeId, Span};

impl Interpreter {
    pub(super) fn eval_method_call(
        &mut self,
        id: NodeId,
        target: Option<NodeId>,
        name: Name,
        args: &[NodeId],
    ) -> EvalResult {
        let call_span = Some(self.tree.span(id));
        let text = self.text(name);
        let Some(target) = target else {
            let argv = self.eval_args(text, args)?;
            return self.call_unqualified(name, argv, call_span);
        };
        let receiver = self.eval_expr(target)?;
        match &receiver {
            Value::Void => {
                return Err(EvalErrorKind::VoidDereference {
                    name: text.to_owned(),
                }
                .into())
            }
            Value::Null => {
                return Err(EvalErrorKind::NullDereference {
                    what: format!("method invocation {text}"),
                }
                .into())
            }
            Value::Primitive(_) => {
                return Err(EvalErrorKind::PrimitiveDereference {
                    name: text.to_owned(),
                }
                .into())
            }
            _ => {}
        }
        let argv = self.eval_args(text, args)?;
        let callable = self
            .runtime
            .host
            .resolve_method(&receiver, text, &argv)
            .map_err(|err| match err {
                HostError::NotFound(_) => undefined_method(text, &argv),
                other => other.into(),
            })?;
        self.invoke_callable(&callable, argv, call_span)
    }

    /// Evaluate call arguments left to right; none may be `void`.
    pub(super) fn eval_args(&mut self, method: &str, args: &[NodeId]) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for (position, &arg) in args.iter().enumerate() {
            let value = self.eval_expr(arg)?;
            if value.is_void() {
                return Err(EvalErrorKind::VoidArgument {
                    method: method.to_owned(),
                    position,
                }
                .into());
            }
            values.push(value);
        }
        Ok(values)
    }

    fn call_unqualified(&mut self, name: Name, args: Vec<Value>, call_span: Option<Span>) -> EvalResult {
        let top = self.call_stack.top();
        if let Some(method) = self.scopes.lookup_method(top, name)? {
            return self.invoke_script(&method, args, call_span);
        }
        let held = match self.scopes.lookup(top, name)? {
            Some(slot) => match &slot.value {
                Value::Callable(callable) => Some(callable.clone()),
                _ => None,
            },
            None => None,
        };
        if let Some(callable) = held {
            return self.invoke_callable(&callable, args, call_span);
        }
        let text = self.text(name);
        self.runtime
            .host
            .invoke_function(text, &args)
            .map_err(|err| match err {
                HostError::NotFound(_) => undefined_method(text, &args),
                other => other.into(),
            })
    }

    pub(crate) fn invoke_callable(
        &mut self,
        callable: &Callable,
        args: Vec<Value>,
        call_span: Option<Span>,
    ) -> EvalResult {
        match callable {
            Callable::Script(method) => self.invoke_script(method, args, call_span),
            Callable::Host(bound) => invoke_host(bound.method.name(), bound, &args),
        }
    }

    /// Activate a scripted method: fresh method scope under the declaring
    /// scope, parameters bound, body run in the method's own arena.
    #[tracing::instrument(level = "debug", skip_all, fields(arity = args.len()))]
    pub(crate) fn invoke_script(
        &mut self,
        method: &Arc<ScriptMethod>,
        args: Vec<Value>,
        call_span: Option<Span>,
    ) -> EvalResult {
        let name = self.text(method.name);
        if args.len() != method.params.len() {
            return Err(EvalErrorKind::ArgumentCount {
                method: name.to_owned(),
                expected: method.params.len(),
                found: args.len(),
            }
            .into());
        }
        let scope = self.scopes.create(ScopeKind::Method, Some(method.scope));
        let completion = {
            let mut frame = FrameGuard::enter(self, scope, method.name, call_span, &method.tree)?;
            frame.bind_params(scope, method, args)?;
            match method.body {
                Some(body) => frame.exec(body)?,
                None => Completion::void(),
            }
        };
        let value = completion.at_method_boundary()?;
        self.check_return(method, value)
    }

    fn bind_params(
        &mut self,
        scope: ScopeId,
        method: &ScriptMethod,
        args: Vec<Value>,
    ) -> Result<(), EvalError> {
        for ((param, ty), arg) in method.params.iter().zip(args) {
            let display = self.text(*param);
            match ty {
                Some(ty) => {
                    let value = convert(
                        &*self.runtime.host,
                        &arg,
                        ty,
                        Conversion::Assignment,
                        &format!("argument '{display}' of {}", self.text(method.name)),
                    )?;
                    self.scopes
                        .declare_typed(scope, *param, ty.clone(), Modifiers::empty(), value, display)?;
                }
                None => self.scopes.define_untyped(scope, *param, arg)?,
            }
        }
        Ok(())
    }

    fn check_return(&self, method: &ScriptMethod, value: Value) -> EvalResult {
        let name = self.text(method.name);
        match &method.return_type {
            ReturnType::Loose => Ok(value),
            ReturnType::Void if value.is_void() => Ok(Value::Void),
            ReturnType::Void => Err(EvalErrorKind::VoidReturn {
                method: name.to_owned(),
            }
            .into()),
            ReturnType::Typed(ty) if value.is_void() => Err(type_mismatch(
                &format!("return value of {name}"),
                &ty.to_string(),
                "void",
            )),
            ReturnType::Typed(ty) => convert(
                &*self.runtime.host,
                &value,
                ty,
                Conversion::Assignment,
                &format!("return value of {name}"),
            ),
        }
    }
}

#[tracing::instrument(level = "debug", skip(bound, args))]
fn invoke_host(method: &str, bound: &BoundMethod, args: &[Value]) -> EvalResult {
    Ok(bound.method.invoke(&bound.receiver, args)?)
}

#[cold]
fn undefined_method(name: &str, args: &[Value]) -> EvalError {
    let types: Vec<String> = args.iter().map(Value::type_name).collect();
    EvalErrorKind::UndefinedMethod {
        signature: format!("{name}({})", types.join(", ")),
    }
    .into()
}
