//! Type syntax: primitive kinds, written type references and modifiers.

use crate::Name;
use bitflags::bitflags;

/// The eight primitive kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        Self::Bool,
        Self::Char,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Keyword spelling.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == word)
    }

    /// Fully qualified name of the boxed wrapper type.
    pub const fn wrapper_name(self) -> &'static str {
        match self {
            Self::Bool => "java.lang.Boolean",
            Self::Char => "java.lang.Character",
            Self::Byte => "java.lang.Byte",
            Self::Short => "java.lang.Short",
            Self::Int => "java.lang.Integer",
            Self::Long => "java.lang.Long",
            Self::Float => "java.lang.Float",
            Self::Double => "java.lang.Double",
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool)
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Char | Self::Byte | Self::Short | Self::Int | Self::Long
        )
    }
}

/// Base of a written type, before array dimensions.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BaseTypeSyntax {
    Primitive(PrimitiveKind),
    /// A possibly qualified name, segments in source order.
    Named(Vec<Name>),
}

/// A type as written in source: `int`, `String[]`, `java.util.List`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeSyntax {
    pub base: BaseTypeSyntax,
    pub dims: u8,
}

impl TypeSyntax {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeSyntax {
            base: BaseTypeSyntax::Primitive(kind),
            dims: 0,
        }
    }

    pub fn named(segments: Vec<Name>) -> Self {
        TypeSyntax {
            base: BaseTypeSyntax::Named(segments),
            dims: 0,
        }
    }

    #[must_use]
    pub fn with_dims(mut self, dims: u8) -> Self {
        self.dims = dims;
        self
    }
}

/// Declared return type of a method.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ReturnTypeSyntax {
    /// No return type written (loosely typed method).
    Loose,
    /// `void`
    Void,
    Typed(TypeSyntax),
}

bitflags! {
    /// Declaration modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SYNCHRONIZED = 1 << 6;
        const TRANSIENT = 1 << 7;
        const VOLATILE = 1 << 8;
        const NATIVE = 1 << 9;
        const STRICTFP = 1 << 10;
    }
}

/// A formal parameter of a method or catch clause. `ty` is `None` when untyped.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FormalParam {
    pub name: Name,
    pub ty: Option<TypeSyntax>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_keyword("String"), None);
    }

    #[test]
    fn integral_kinds() {
        assert!(PrimitiveKind::Char.is_integral());
        assert!(!PrimitiveKind::Float.is_integral());
        assert!(!PrimitiveKind::Bool.is_numeric());
    }
}
