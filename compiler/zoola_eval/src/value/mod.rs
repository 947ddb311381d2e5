//! Value model for the evaluator.
//!
//! [`Value`] is a closed enum. `Void` ("no value", also what an undefined
//! name reads as) and `Null` (an explicit null reference) are distinct and
//! never compare equal. Strings, arrays and exceptions are foreign references
//! to engine-provided host objects, so `==` on them is reference identity;
//! [`PartialEq`] compares strings and boxed wrappers by content instead.

mod callable;
mod objects;
mod primitive;
mod types;

pub use callable::{BoundMethod, Callable, HostMethod, ReturnType, ScriptMethod};
pub use objects::{
    render_container, ArrayObject, ForeignRef, HostObject, StrObject, ThrowableObject,
};
pub use primitive::{is_widening, Primitive};
pub use types::{names, BaseType, ClassRef, TypeRef};

use std::fmt;
use zoola_ir::PrimitiveKind;

#[derive(Clone, Debug)]
pub enum Value {
    Primitive(Primitive),
    /// No value / undefined.
    Void,
    /// Explicit null reference.
    Null,
    Foreign(ForeignRef),
    Callable(Callable),
    Type(TypeRef),
}

impl Value {
    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Primitive(Primitive::Bool(b))
    }

    #[inline]
    pub fn int(i: i32) -> Self {
        Value::Primitive(Primitive::Int(i))
    }

    #[inline]
    pub fn long(l: i64) -> Self {
        Value::Primitive(Primitive::Long(l))
    }

    #[inline]
    pub fn float(f: f32) -> Self {
        Value::Primitive(Primitive::Float(f))
    }

    #[inline]
    pub fn double(d: f64) -> Self {
        Value::Primitive(Primitive::Double(d))
    }

    #[inline]
    pub fn byte(b: i8) -> Self {
        Value::Primitive(Primitive::Byte(b))
    }

    #[inline]
    pub fn short(s: i16) -> Self {
        Value::Primitive(Primitive::Short(s))
    }

    /// Char from a Rust `char`; characters outside the BMP keep their high surrogate.
    pub fn char(c: char) -> Self {
        let mut buf = [0u16; 2];
        Value::Primitive(Primitive::Char(c.encode_utf16(&mut buf)[0]))
    }

    /// Fresh string object.
    pub fn string(text: &str) -> Self {
        Value::Foreign(ForeignRef::new(StrObject::new(text)))
    }

    pub fn foreign<T: HostObject>(object: T) -> Self {
        Value::Foreign(ForeignRef::new(object))
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Primitive value of a primitive or of a boxed wrapper object.
    pub fn unboxed(&self) -> Option<Primitive> {
        match self {
            Value::Primitive(p) => Some(*p),
            Value::Foreign(obj) => obj.object().unbox(),
            _ => None,
        }
    }

    /// Whether this is a boxed wrapper object (not a bare primitive).
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Value::Foreign(obj) if obj.object().unbox().is_some())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.unboxed().and_then(Primitive::as_bool)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Foreign(obj) => obj.as_str(),
            _ => None,
        }
    }

    pub fn as_foreign(&self) -> Option<&ForeignRef> {
        match self {
            Value::Foreign(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayObject> {
        self.as_foreign().and_then(ForeignRef::as_array)
    }

    /// Runtime type; `None` for `void` and `null`.
    pub fn value_type(&self) -> Option<TypeRef> {
        match self {
            Value::Primitive(p) => Some(TypeRef::primitive(p.kind())),
            Value::Foreign(obj) => Some(obj.type_ref()),
            Value::Callable(_) => Some(TypeRef::class(names::SCRIPT_METHOD)),
            Value::Type(_) => Some(TypeRef::class(names::CLASS)),
            Value::Void | Value::Null => None,
        }
    }

    /// Name of the value's type for fault messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_owned(),
            Value::Null => "null".to_owned(),
            other => other
                .value_type()
                .map_or_else(|| "unknown".to_owned(), |t| t.to_string()),
        }
    }

    /// Reference identity, the meaning of `==` on non-primitives.
    pub fn identity_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Primitive(a), Value::Primitive(b)) => a == b,
            (Value::Foreign(a), Value::Foreign(b)) => a.ptr_eq(b),
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.as_primitive().map(Primitive::kind)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Foreign(a), Value::Foreign(b)) => {
                a.ptr_eq(b)
                    || a.object().content_eq(b.object())
                    || matches!((a.object().unbox(), b.object().unbox()), (Some(x), Some(y)) if x == y)
            }
            _ => self.identity_eq(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(p) => write!(f, "{p}"),
            Value::Void => f.write_str("void"),
            Value::Null => f.write_str("null"),
            Value::Foreign(obj) => f.write_str(&obj.object().display()),
            Value::Callable(Callable::Script(m)) => write!(f, "scripted method/{}", m.params.len()),
            Value::Callable(Callable::Host(b)) => write!(f, "method {}", b.method.name()),
            Value::Type(t) => write!(f, "class {t}"),
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Primitive(p)
    }
}
