//! Resolved type references.

use super::{Primitive, Value};
use std::fmt;
use std::sync::Arc;
use zoola_ir::PrimitiveKind;

/// Well-known host type names the engine itself refers to.
pub mod names {
    pub const OBJECT: &str = "java.lang.Object";
    pub const STRING: &str = "java.lang.String";
    pub const CLASS: &str = "java.lang.Class";
    pub const THROWABLE: &str = "java.lang.Throwable";
    pub const EXCEPTION: &str = "java.lang.Exception";
    pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
    pub const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";
    pub const INDEX_OUT_OF_BOUNDS: &str = "java.lang.ArrayIndexOutOfBoundsException";
    pub const NEGATIVE_ARRAY_SIZE: &str = "java.lang.NegativeArraySizeException";
    /// The engine's marker type: every primitive is an instance of it.
    pub const PRIMITIVE_MARKER: &str = "zoola.Primitive";
    /// Type reported for scripted methods held as values.
    pub const SCRIPT_METHOD: &str = "zoola.Method";
}

/// A host class, identified by its fully qualified name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClassRef(Arc<str>);

impl ClassRef {
    pub fn new(name: &str) -> Self {
        ClassRef(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    pub fn is(&self, name: &str) -> bool {
        &*self.0 == name
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element type of a [`TypeRef`] before array dimensions.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Primitive(PrimitiveKind),
    Class(ClassRef),
    /// The engine's own "primitive" marker type.
    PrimitiveMarker,
}

/// A resolved type, possibly array-dimensioned.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeRef {
    pub base: BaseType,
    pub dims: u8,
}

impl TypeRef {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeRef {
            base: BaseType::Primitive(kind),
            dims: 0,
        }
    }

    pub fn class(name: &str) -> Self {
        TypeRef {
            base: BaseType::Class(ClassRef::new(name)),
            dims: 0,
        }
    }

    pub fn marker() -> Self {
        TypeRef {
            base: BaseType::PrimitiveMarker,
            dims: 0,
        }
    }

    pub fn string() -> Self {
        Self::class(names::STRING)
    }

    pub fn object() -> Self {
        Self::class(names::OBJECT)
    }

    #[must_use]
    pub fn with_dims(mut self, dims: u8) -> Self {
        self.dims = dims;
        self
    }

    /// One more array dimension.
    #[must_use]
    pub fn array_of(&self) -> Self {
        TypeRef {
            base: self.base.clone(),
            dims: self.dims.saturating_add(1),
        }
    }

    /// Element type of an array type.
    pub fn component(&self) -> Option<Self> {
        (self.dims > 0).then(|| TypeRef {
            base: self.base.clone(),
            dims: self.dims - 1,
        })
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// The primitive kind of a non-array primitive type.
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.base {
            BaseType::Primitive(kind) if self.dims == 0 => Some(kind),
            _ => None,
        }
    }

    /// The class of a non-array class type.
    pub fn as_class(&self) -> Option<&ClassRef> {
        match &self.base {
            BaseType::Class(class) if self.dims == 0 => Some(class),
            _ => None,
        }
    }

    /// Name as the host's class objects report it: `[I` for `int[]`,
    /// `[[Ljava.lang.String;` for `String[][]`, the plain name otherwise.
    pub fn binary_name(&self) -> String {
        if self.dims == 0 {
            return self.to_string();
        }
        let mut name = "[".repeat(usize::from(self.dims));
        match &self.base {
            BaseType::Primitive(kind) => name.push(match kind {
                PrimitiveKind::Bool => 'Z',
                PrimitiveKind::Char => 'C',
                PrimitiveKind::Byte => 'B',
                PrimitiveKind::Short => 'S',
                PrimitiveKind::Int => 'I',
                PrimitiveKind::Long => 'J',
                PrimitiveKind::Float => 'F',
                PrimitiveKind::Double => 'D',
            }),
            BaseType::Class(class) => {
                name.push('L');
                name.push_str(class.name());
                name.push(';');
            }
            BaseType::PrimitiveMarker => {
                name.push('L');
                name.push_str(names::PRIMITIVE_MARKER);
                name.push(';');
            }
        }
        name
    }

    /// Value an uninitialized slot of this type holds.
    pub fn default_value(&self) -> Value {
        match self.as_primitive() {
            Some(kind) => Value::Primitive(Primitive::default_for(kind)),
            None => Value::Null,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Primitive(kind) => f.write_str(kind.keyword())?,
            BaseType::Class(class) => f.write_str(class.name())?,
            BaseType::PrimitiveMarker => f.write_str(names::PRIMITIVE_MARKER)?,
        }
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
