//! `throw` and the try/catch/finally state machine.
//!
//! ```text
//! RUNNING_TRY -> normal | faulted
//! faulted (thrown value) -> MATCHING_CATCH -> matched | unmatched
//! -> RUNNING_FINALLY -> signal overrides | rethrow pending | fall through
//! ```
//!
//! Evaluation faults carry no thrown value, so they skip catch matching but
//! still run `finally`, and are re-raised even when `finally` completes
//! with a signal. Internal faults leave the statement immediately.

use super::Interpreter;
use crate::coercion::{try_convert, Conversion};
use crate::completion::{Completion, ExecResult};
use crate::errors::{strict, thrown, EvalError, EvalErrorKind, EvalResult, FaultClass};
use crate::value::Value;
use zoola_ir::{CatchClause, Modifiers, NodeId};

impl Interpreter {
    pub(super) fn exec_throw(&mut self, value: NodeId) -> EvalResult {
        let value = self.eval_expr(value)?;
        let throwable = value
            .as_foreign()
            .map(|obj| obj.type_ref())
            .is_some_and(|ty| ty.as_class().is_some_and(|c| self.runtime.host.is_throwable(c)));
        if !throwable {
            return Err(EvalErrorKind::NotThrowable {
                found: value.type_name(),
            }
            .into());
        }
        Err(thrown(value))
    }

    pub(super) fn exec_try(
        &mut self,
        body: NodeId,
        catches: &[CatchClause],
        finally: Option<NodeId>,
    ) -> ExecResult {
        let depth = self.call_stack.depth();
        let outcome = self.exec(body);
        if self.call_stack.depth() > depth {
            tracing::warn!(
                recorded = depth,
                found = self.call_stack.depth(),
                "call stack deeper than recorded at try"
            );
            let popped = self.call_stack.truncate(depth);
            tracing::debug!(popped, "call stack truncated");
        }

        let pending = match outcome {
            Err(err) if err.class() == FaultClass::Internal => return Err(err),
            Err(err) => match err.thrown_value().cloned() {
                Some(value) => self.catch(catches, value, err),
                None => Err(err),
            },
            ok => ok,
        };

        if let Some(finally) = finally {
            let completion = self.exec(finally)?;
            if completion.is_signal() {
                // Only thrown values can be overridden; evaluation faults
                // always reach the caller.
                return match pending {
                    Err(err) if err.class() == FaultClass::Evaluation => {
                        tracing::debug!(fault = %err, "finally signal ignored for evaluation fault");
                        Err(err)
                    }
                    _ => Ok(completion),
                };
            }
        }

        match pending? {
            signal @ Completion::Signal(_) => Ok(signal),
            Completion::Normal(_) => Ok(Completion::void()),
        }
    }

    /// Run the first clause whose parameter accepts `value`. Unmatched
    /// faults come back unchanged; a fault in the catch body replaces it.
    fn catch(&mut self, catches: &[CatchClause], value: Value, fault: EvalError) -> ExecResult {
        if self.config.strict_java {
            if let Some(clause) = catches.iter().find(|c| c.param.ty.is_none()) {
                return Err(strict(format!(
                    "untyped catch parameter '{}'",
                    self.text(clause.param.name)
                )));
            }
        }
        for clause in catches {
            let declared = clause
                .param
                .ty
                .as_ref()
                .map(|ty| self.resolve_type(ty))
                .transpose()?;
            let bound = match &declared {
                Some(ty) => {
                    match try_convert(&*self.runtime.host, &value, ty, Conversion::Assignment) {
                        Some(bound) => bound,
                        None => continue,
                    }
                }
                None => value.clone(),
            };
            let name = clause.param.name;
            let param_name = self.text(name);
            tracing::trace!(param = param_name, "catch matched");
            return self.with_block_scope(|scoped| {
                let scope = scoped.scope();
                match declared {
                    Some(ty) => scoped.scopes.declare_typed(
                        scope,
                        name,
                        ty,
                        Modifiers::empty(),
                        bound,
                        param_name,
                    )?,
                    None => scoped.scopes.define_untyped(scope, name, bound)?,
                }
                scoped.exec(clause.body)
            });
        }
        Err(fault)
    }
}
