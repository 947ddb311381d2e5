//! Control-signal protocol.
//!
//! `return`, `break` and `continue` travel up through statement evaluation
//! as ordinary results tagged [`Completion::Signal`], never as faults. Each
//! construct decides what it absorbs through one function here:
//!
//! | Construct   | Absorbs           | Re-propagates                 |
//! |-------------|-------------------|-------------------------------|
//! | loop        | BREAK, CONTINUE   | RETURN                        |
//! | switch      | BREAK             | RETURN, CONTINUE              |
//! | block       | none              | everything                    |
//! | try         | none              | everything, after `finally`   |
//! | method body | RETURN (unwrapped)| BREAK/CONTINUE are faults     |

use crate::errors::{misplaced_control, EvalError};
use crate::value::Value;
use zoola_ir::NodeId;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SignalKind {
    Return,
    Break,
    Continue,
}

impl SignalKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
        }
    }
}

/// A pending `return`/`break`/`continue`.
#[derive(Clone, Debug)]
pub struct ControlSignal {
    pub kind: SignalKind,
    /// Returned value; `Void` for `break`, `continue` and bare `return`.
    pub payload: Value,
    /// Statement that produced the signal.
    pub origin: NodeId,
}

/// Outcome of evaluating a node.
#[derive(Clone, Debug)]
pub enum Completion {
    Normal(Value),
    Signal(ControlSignal),
}

/// Result of statement evaluation.
pub type ExecResult = Result<Completion, EvalError>;

/// What a loop does after its body completes.
#[derive(Debug)]
pub enum LoopStep {
    /// Run the update/condition step and go on.
    Next,
    /// Leave the loop with this completion.
    Exit(Completion),
}

impl Completion {
    #[inline]
    pub fn void() -> Self {
        Completion::Normal(Value::Void)
    }

    pub fn signal(kind: SignalKind, payload: Value, origin: NodeId) -> Self {
        Completion::Signal(ControlSignal {
            kind,
            payload,
            origin,
        })
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, Completion::Signal(_))
    }

    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            Completion::Signal(s) => Some(s.kind),
            Completion::Normal(_) => None,
        }
    }

    /// Loop rule: BREAK ends the loop with void, CONTINUE ends the iteration,
    /// RETURN leaves unchanged.
    pub fn after_loop_body(self) -> LoopStep {
        match self {
            Completion::Normal(_) => LoopStep::Next,
            Completion::Signal(s) => match s.kind {
                SignalKind::Continue => LoopStep::Next,
                SignalKind::Break => LoopStep::Exit(Completion::void()),
                SignalKind::Return => LoopStep::Exit(Completion::Signal(s)),
            },
        }
    }

    /// Switch rule: BREAK is absorbed, anything else leaves unchanged.
    pub fn after_switch(self) -> Completion {
        match self {
            Completion::Signal(s) if s.kind == SignalKind::Break => Completion::void(),
            // CONTINUE belongs to the enclosing loop, as in the host language.
            Completion::Signal(s) => Completion::Signal(s),
            Completion::Normal(_) => Completion::void(),
        }
    }

    /// Method-body rule: RETURN yields its payload; a normal end yields void.
    pub fn at_method_boundary(self) -> Result<Value, EvalError> {
        match self {
            Completion::Normal(_) => Ok(Value::Void),
            Completion::Signal(s) => match s.kind {
                SignalKind::Return => Ok(s.payload),
                other => Err(misplaced_control(other.keyword(), "loop")),
            },
        }
    }

    /// Top-level unit rule: like a method body, but a normal end yields the
    /// last statement's value.
    pub fn at_unit_boundary(self) -> Result<Value, EvalError> {
        match self {
            Completion::Normal(v) => Ok(v),
            signal => signal.at_method_boundary(),
        }
    }
}
