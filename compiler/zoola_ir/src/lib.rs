//! Syntax-tree data model for the zoola scripting engine.
//!
//! The parser (an external collaborator) produces a [`SyntaxTree`]: an
//! immutable [`NodeArena`] plus a root [`NodeId`]. Identifiers and string
//! literals are interned through a [`SharedInterner`] that the evaluator
//! and host share.
//!
//! # Architecture
//!
//! - [`ast`]: closed [`NodeKind`] enum, operators, written types, modifiers
//! - [`NodeArena`]: flat node storage with process-unique [`ArenaId`]
//! - [`AstBuilder`]: programmatic construction for parsers, embedders and tests

pub mod ast;
mod arena;
mod builder;
mod interner;
mod name;
mod node_id;
mod span;

pub use arena::{ArenaId, NodeArena, SyntaxTree};
pub use ast::{
    ArrayDims, AssignOp, BaseTypeSyntax, BinaryOp, CatchClause, ClassDecl, Declarator,
    FormalParam, Literal, MethodDecl, Modifiers, Node, NodeKind, PrimitiveKind,
    ReturnTypeSyntax, SwitchCase, TypeSyntax, UnaryOp, VarDecl,
};
pub use builder::AstBuilder;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use node_id::NodeId;
pub use span::Span;
