//! Capabilities the evaluator consumes from its embedding.
//!
//! - [`HostResolver`]: type names, fields, methods, constructors and
//!   assignability of foreign objects.
//! - [`IterableAdapter`]: turns a value into a forward-only cursor for
//!   enhanced-for.
//! - [`ClassGenerator`]: synthesizes a host type from a class declaration.
//!
//! [`BasicHost`] is a small reference implementation used by tests and by
//! embedders that only need strings, lists, maps and exceptions.

mod basic;

pub use basic::{BasicHost, Boxed, ListObject, MapObject};

use crate::errors::HostError;
use crate::value::{names, Callable, ClassRef, ForeignRef, ThrowableObject, TypeRef, Value};
use std::sync::Arc;
use zoola_ir::{Modifiers, NodeArena, NodeId};

/// Name, member and assignability resolution against host objects.
pub trait HostResolver: Send + Sync {
    /// Resolve a (possibly qualified) type name.
    fn resolve_type(&self, name: &str) -> Result<TypeRef, HostError>;

    /// Whether a value of class `source` may be stored where `target` is
    /// expected. Only called with non-array classes.
    fn is_assignable(&self, target: &ClassRef, source: &ClassRef) -> bool;

    fn is_interface(&self, _class: &ClassRef) -> bool {
        false
    }

    /// Whether values of `class` may be thrown.
    fn is_throwable(&self, class: &ClassRef) -> bool {
        self.is_assignable(&throwable_class(), class)
    }

    /// Field read; `target` is an object or, for static fields, a type value.
    fn get_field(&self, target: &Value, name: &str) -> Result<Value, HostError>;

    fn set_field(&self, target: &Value, name: &str, value: Value) -> Result<(), HostError>;

    /// `target{key}` read. Defaults to a field read.
    fn get_property(&self, target: &Value, key: &str) -> Result<Value, HostError> {
        self.get_field(target, key)
    }

    fn set_property(&self, target: &Value, key: &str, value: Value) -> Result<(), HostError> {
        self.set_field(target, key, value)
    }

    /// Overload resolution of `name` on `receiver` (an object or a type
    /// value for static methods) for the given arguments.
    fn resolve_method(
        &self,
        receiver: &Value,
        name: &str,
        args: &[Value],
    ) -> Result<Callable, HostError>;

    /// Unqualified host function (a "command" such as `print`).
    fn invoke_function(&self, name: &str, _args: &[Value]) -> Result<Value, HostError> {
        Err(HostError::NotFound(format!("command {name}")))
    }

    fn construct(&self, ty: &TypeRef, args: &[Value]) -> Result<Value, HostError>;

    /// Exception object for faults the engine raises itself.
    fn new_exception(&self, class: &str, message: &str) -> Value {
        Value::Foreign(ForeignRef::new(ThrowableObject::new(class, Some(message))))
    }
}

/// Cursor over the elements of an iterable value.
pub type Cursor = Box<dyn Iterator<Item = Value>>;

/// Decides whether a value can be iterated and produces the cursor.
pub trait IterableAdapter: Send + Sync {
    /// `None` when the value is not iterable. A cursor may yield `Void` for
    /// a host-level absent element; the evaluator binds it as `null`.
    fn cursor(&self, value: &Value) -> Option<Cursor>;
}

/// Iterates engine arrays, strings (by char) and any host object that
/// exposes [`HostObject::iter_values`](crate::value::HostObject::iter_values).
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultIterables;

impl IterableAdapter for DefaultIterables {
    fn cursor(&self, value: &Value) -> Option<Cursor> {
        match value {
            Value::Foreign(obj) => obj
                .object()
                .iter_values()
                .map(|items| Box::new(items.into_iter()) as Cursor),
            _ => None,
        }
    }
}

/// Everything a class generator needs from a class declaration.
#[derive(Debug)]
pub struct ClassSpec<'a> {
    pub name: &'a str,
    pub modifiers: Modifiers,
    pub is_interface: bool,
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub tree: &'a Arc<NodeArena>,
    pub body: Option<NodeId>,
}

/// Synthesizes host-loadable types from scripted class bodies.
pub trait ClassGenerator: Send + Sync {
    fn generate(&self, spec: &ClassSpec<'_>) -> Result<TypeRef, HostError>;
}

/// Generator for embeddings without class support.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoClassGenerator;

impl ClassGenerator for NoClassGenerator {
    fn generate(&self, spec: &ClassSpec<'_>) -> Result<TypeRef, HostError> {
        Err(HostError::Failed(format!(
            "class generation is not available for {}",
            spec.name
        )))
    }
}

/// The type of a throwable root, for `throw` and catch checks.
pub(crate) fn throwable_class() -> ClassRef {
    ClassRef::new(names::THROWABLE)
}
