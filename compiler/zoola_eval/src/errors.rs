//! Fault types raised during evaluation.
//!
//! # Fault classes
//!
//! - `Evaluation`: malformed construct, undefined name, type-incompatible
//!   operator use, void/null misuse. Never script-catchable as a typed
//!   exception, but `finally` blocks still run while it unwinds.
//! - `Thrown`: a target fault wrapping a value thrown by `throw` or raised by
//!   a host call. Catch clauses match against the wrapped value.
//! - `Internal`: an evaluator invariant broke. Always fatal.
//!
//! Factory functions (`undefined_variable`, `void_operand`, ...) are the
//! public way to build faults; the evaluator attaches span, node and
//! backtrace as the fault leaves the node that raised it.

use crate::value::Value;
use std::fmt;
use zoola_ir::{NodeId, Span};

/// Result of expression evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Failure reported by a host collaborator.
#[derive(Clone, Debug, thiserror::Error)]
pub enum HostError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("ambiguous {0}")]
    Ambiguous(String),
    #[error("{0} is not accessible")]
    Inaccessible(String),
    #[error("{0}")]
    Failed(String),
    /// The host call threw; the value is re-raised as a target fault.
    #[error("host call threw {0}")]
    Thrown(Value),
}

/// Coarse classification of a fault.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FaultClass {
    Evaluation,
    Thrown,
    Internal,
}

/// Typed fault category.
#[derive(Clone, Debug, thiserror::Error)]
pub enum EvalErrorKind {
    // Names
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },
    #[error("name not found: {name}")]
    UndefinedName { name: String },
    #[error("command not found: {signature}")]
    UndefinedMethod { signature: String },

    // Assignment and declarations
    #[error("can't assign to {what}")]
    NotAssignable { what: String },
    #[error("void assignment")]
    VoidAssignment,
    #[error("variable '{name}' is already defined in this scope")]
    Redeclared { name: String },
    #[error("cannot assign a value to final variable '{name}'")]
    FinalAssignment { name: String },
    #[error("void initializer for '{name}'")]
    VoidInitializer { name: String },
    #[error("(strict mode) {what}")]
    Strict { what: String },

    // Operators and coercion
    #[error("illegal use of undefined variable, class, or 'void' literal with '{op}'")]
    VoidOperand { op: &'static str },
    #[error("illegal use of null value or 'null' literal with '{op}'")]
    NullOperand { op: &'static str },
    #[error("operator '{op}' inappropriate for objects")]
    ObjectOperator { op: &'static str },
    #[error("operator '{op}' cannot be applied to {operand}")]
    InvalidOperand { op: &'static str, operand: String },
    #[error("incompatible operand types for '{op}': {left} and {right}")]
    IncompatibleOperands {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("use of non + operator with String LHS: '{op}'")]
    StringCompound { op: &'static str },
    #[error("non primitive value in operator '{op}'")]
    NonPrimitiveCompound { op: &'static str },
    #[error("{context}: cannot convert {found} to {target}")]
    TypeMismatch {
        context: String,
        target: String,
        found: String,
    },
    /// Integer division by zero; re-raised by the evaluator as a thrown
    /// `ArithmeticException`.
    #[error("{message}")]
    Arithmetic { message: &'static str },

    // Conditions and control
    #[error("condition evaluates to void type")]
    ConditionVoid,
    #[error("condition must evaluate to a Boolean or boolean, found {found}")]
    ConditionNotBoolean { found: String },
    #[error("'{keyword}' outside of an enclosing {context}")]
    MisplacedControl {
        keyword: &'static str,
        context: &'static str,
    },
    #[error("empty switch statement")]
    EmptySwitch,
    #[error(
        "the collection, array, map, iterator, or enumeration portion of a for statement cannot be null"
    )]
    NullIteration,
    #[error("can't iterate over type: {type_name}")]
    NotIterable { type_name: String },
    #[error("expression in 'throw' must be Exception type, found {found}")]
    NotThrowable { found: String },
    #[error("synchronized on {found}")]
    InvalidMonitor { found: String },

    // Calls
    #[error("undefined argument at position {position} in call to {method}")]
    VoidArgument { method: String, position: usize },
    #[error("wrong number of arguments for {method}: expected {expected}, found {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("cannot return a value from void method {method}")]
    VoidReturn { method: String },
    #[error("maximum call depth exceeded ({depth})")]
    StackOverflow { depth: usize },

    // Objects and arrays
    #[error("null pointer: {what}")]
    NullDereference { what: String },
    #[error("attempt to access '{name}' on undefined variable or class name")]
    VoidDereference { name: String },
    #[error("attempt to access '{name}' on a primitive")]
    PrimitiveDereference { name: String },
    #[error("property key must be a String, found {found}")]
    PropertyKey { found: String },
    #[error("not an array: {found}")]
    NotAnArray { found: String },
    #[error("arrays may only be indexed by integer types, found {found}")]
    NonIntegralIndex { found: String },
    #[error("array dimension must evaluate to an integer, found {found} at index {position}")]
    NonIntegralDimension { found: String, position: usize },
    #[error(
        "incompatible initializer: allocation calls for a {expected} dimensional array, but initializer is a {found} dimensional array"
    )]
    ArrayDimensionMismatch { expected: usize, found: usize },
    #[error("invalid location for initializer, position: {position}")]
    InitializerLocation { position: usize },
    #[error("void in array initializer, position {position}")]
    VoidInArrayInit { position: usize },
    #[error(
        "incompatible type: {element} in initializer of array type: {array} at position: {position}"
    )]
    ArrayInitElement {
        element: String,
        array: String,
        position: usize,
    },

    // Types and classes
    #[error("type: {name} is not an interface")]
    NotInterface { name: String },

    /// A collaborator failed without throwing.
    #[error(transparent)]
    Host(HostError),

    /// Target fault: a value thrown by script or host.
    #[error("uncaught exception: {0}")]
    Thrown(Value),

    #[error("internal evaluator error: {message}")]
    Internal { message: String },
}

impl EvalErrorKind {
    pub fn class(&self) -> FaultClass {
        match self {
            EvalErrorKind::Thrown(_) => FaultClass::Thrown,
            EvalErrorKind::Internal { .. } => FaultClass::Internal,
            _ => FaultClass::Evaluation,
        }
    }
}

/// One frame of a captured call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub name: String,
    pub span: Option<Span>,
}

/// Snapshot of the call stack taken when a fault was raised, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    pub frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span:?}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A fault plus where it happened.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Source span of the node that raised the fault.
    pub span: Option<Span>,
    /// Node that raised the fault.
    pub node: Option<NodeId>,
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            span: None,
            node: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    pub fn class(&self) -> FaultClass {
        self.kind.class()
    }

    pub fn is_thrown(&self) -> bool {
        self.class() == FaultClass::Thrown
    }

    /// The value carried by a target fault.
    pub fn thrown_value(&self) -> Option<&Value> {
        match &self.kind {
            EvalErrorKind::Thrown(value) => Some(value),
            _ => None,
        }
    }

    /// Attach the node position unless one is already recorded.
    #[must_use]
    pub fn at(mut self, node: NodeId, span: Span) -> Self {
        if self.node.is_none() {
            self.node = Some(node);
            self.span = Some(span);
        }
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Format for a top-level reporter: message, `line:column` when the
    /// source is known, notes, then the backtrace.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = String::new();
        match (self.span, source) {
            (Some(span), Some(text)) if !span.is_dummy() => {
                let (line, col) = span.line_col(text);
                out.push_str(&format!("error at {line}:{col}: {}", self.kind));
            }
            _ => out.push_str(&format!("error: {}", self.kind)),
        }
        for note in &self.notes {
            out.push_str(&format!("\n  note: {note}"));
        }
        if let Some(bt) = self.backtrace.as_ref().filter(|bt| !bt.is_empty()) {
            out.push('\n');
            out.push_str(&bt.to_string());
        }
        out
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

impl From<HostError> for EvalError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Thrown(value) => EvalError::new(EvalErrorKind::Thrown(value)),
            other => EvalError::new(EvalErrorKind::Host(other)),
        }
    }
}

// Factories

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalErrorKind::UndefinedVariable {
        name: name.to_owned(),
    }
    .into()
}

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalErrorKind::UndefinedName {
        name: name.to_owned(),
    }
    .into()
}

#[cold]
pub fn not_assignable(what: &str) -> EvalError {
    EvalErrorKind::NotAssignable {
        what: what.to_owned(),
    }
    .into()
}

#[cold]
pub fn void_operand(op: &'static str) -> EvalError {
    EvalErrorKind::VoidOperand { op }.into()
}

#[cold]
pub fn null_operand(op: &'static str) -> EvalError {
    EvalErrorKind::NullOperand { op }.into()
}

#[cold]
pub fn invalid_operand(op: &'static str, operand: &str) -> EvalError {
    EvalErrorKind::InvalidOperand {
        op,
        operand: operand.to_owned(),
    }
    .into()
}

#[cold]
pub fn type_mismatch(context: &str, target: &str, found: &str) -> EvalError {
    EvalErrorKind::TypeMismatch {
        context: context.to_owned(),
        target: target.to_owned(),
        found: found.to_owned(),
    }
    .into()
}

#[cold]
pub fn strict(what: impl Into<String>) -> EvalError {
    EvalErrorKind::Strict { what: what.into() }.into()
}

#[cold]
pub fn misplaced_control(keyword: &'static str, context: &'static str) -> EvalError {
    EvalErrorKind::MisplacedControl { keyword, context }.into()
}

#[cold]
pub fn thrown(value: Value) -> EvalError {
    EvalErrorKind::Thrown(value).into()
}

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalErrorKind::Internal {
        message: message.into(),
    }
    .into()
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalErrorKind::StackOverflow { depth }.into()
}
