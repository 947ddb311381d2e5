//! Callable values: scripted methods and bound host methods.

use super::{TypeRef, Value};
use crate::errors::HostError;
use crate::scope::ScopeId;
use std::fmt;
use std::sync::Arc;
use zoola_ir::{Modifiers, Name, NodeArena, NodeId};

/// Resolved return type of a scripted method.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReturnType {
    /// No declared type; any value (including none) is returned as-is.
    Loose,
    Void,
    Typed(TypeRef),
}

/// A scripted method, bound to the scope it was declared in.
#[derive(Debug)]
pub struct ScriptMethod {
    pub name: Name,
    pub modifiers: Modifiers,
    /// Parameter names and declared types (`None` when untyped).
    pub params: Vec<(Name, Option<TypeRef>)>,
    pub return_type: ReturnType,
    pub throws: Vec<TypeRef>,
    /// Arena holding the body; methods may outlive the unit that declared them.
    pub tree: Arc<NodeArena>,
    pub body: Option<NodeId>,
    /// Declaring scope; parent of every invocation scope.
    pub scope: ScopeId,
}

/// A host method resolved against a receiver.
pub trait HostMethod: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, HostError>;
}

/// Host method bound to the receiver it was resolved on.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    pub receiver: Box<Value>,
    pub method: Arc<dyn HostMethod>,
}

/// Something that can be invoked with argument values.
#[derive(Clone)]
pub enum Callable {
    Script(Arc<ScriptMethod>),
    Host(BoundMethod),
}

impl Callable {
    pub fn host(receiver: Value, method: Arc<dyn HostMethod>) -> Self {
        Callable::Host(BoundMethod {
            receiver: Box::new(receiver),
            method,
        })
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Script(a), Callable::Script(b)) => Arc::ptr_eq(a, b),
            (Callable::Host(a), Callable::Host(b)) => {
                Arc::ptr_eq(&a.method, &b.method) && a.receiver.identity_eq(&b.receiver)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Script(m) => write!(f, "ScriptMethod({:?}/{})", m.name, m.params.len()),
            Callable::Host(b) => write!(f, "HostMethod({})", b.method.name()),
        }
    }
}
