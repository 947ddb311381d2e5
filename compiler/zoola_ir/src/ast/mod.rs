//! Syntax-tree node kinds.
//!
//! The tree is a closed enum stored in a [`NodeArena`](crate::NodeArena);
//! children are referenced by [`NodeId`]. The evaluator dispatches with an
//! exhaustive `match` on [`NodeKind`], so adding a kind is a compile error
//! until every consumer handles it.

mod operators;
mod types;

pub use operators::{AssignOp, BinaryOp, UnaryOp};
pub use types::{BaseTypeSyntax, FormalParam, Modifiers, PrimitiveKind, ReturnTypeSyntax, TypeSyntax};

use crate::{Name, NodeId, Span};

/// Literal values.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Literal {
    Bool(bool),
    /// UTF-16 code unit.
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// String literal text, interned.
    Str(Name),
    Null,
    Void,
}

/// Dimension part of an array allocation: `new int[2][n][]` or `new int[][]{...}`.
#[derive(Clone, PartialEq, Debug)]
pub struct ArrayDims {
    /// Dimension length expressions, outermost first.
    pub defined: Vec<NodeId>,
    /// Trailing `[]` count.
    pub undefined: u8,
    /// Initializer; only allowed when `defined` is empty.
    pub initializer: Option<NodeId>,
}

impl ArrayDims {
    pub fn total(&self) -> usize {
        self.defined.len() + usize::from(self.undefined)
    }
}

/// One name in a typed variable declaration: `x`, `a[] = {1, 2}`.
#[derive(Clone, PartialEq, Debug)]
pub struct Declarator {
    pub name: Name,
    /// Extra `[]` written after the name.
    pub dims: u8,
    pub init: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct VarDecl {
    pub modifiers: Modifiers,
    pub ty: TypeSyntax,
    pub declarators: Vec<Declarator>,
}

/// A `case` or `default` arm. `label` is `None` for `default`.
#[derive(Clone, PartialEq, Debug)]
pub struct SwitchCase {
    pub label: Option<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct CatchClause {
    pub param: FormalParam,
    pub body: NodeId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MethodDecl {
    pub name: Name,
    pub modifiers: Modifiers,
    pub return_type: ReturnTypeSyntax,
    pub params: Vec<FormalParam>,
    pub throws: Vec<TypeSyntax>,
    /// `None` for abstract or interface methods.
    pub body: Option<NodeId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub modifiers: Modifiers,
    pub is_interface: bool,
    pub extends: Option<TypeSyntax>,
    pub implements: Vec<TypeSyntax>,
    pub body: Option<NodeId>,
}

/// Every node kind the evaluator understands.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind {
    // Expressions
    Literal(Literal),
    /// Simple name: a variable, or a type name resolved by the host.
    Ident(Name),
    /// Dotted name whose meaning (variable fields, type, static field) is
    /// decided at evaluation time.
    QualifiedName(Vec<Name>),
    /// `T.class`
    ClassLiteral(TypeSyntax),
    FieldAccess {
        target: NodeId,
        field: Name,
    },
    Index {
        target: NodeId,
        index: NodeId,
    },
    /// `target{key}` property access.
    Property {
        target: NodeId,
        key: NodeId,
    },
    /// `name(args)` when `target` is `None`, else `target.name(args)`.
    MethodCall {
        target: Option<NodeId>,
        name: Name,
        args: Vec<NodeId>,
    },
    New {
        ty: TypeSyntax,
        args: Vec<NodeId>,
    },
    NewArray {
        element: TypeSyntax,
        dims: ArrayDims,
    },
    ArrayInit(Vec<NodeId>),
    Cast {
        ty: TypeSyntax,
        expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: TypeSyntax,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
        postfix: bool,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Ternary {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },

    // Statements
    Block(Vec<NodeId>),
    Synchronized {
        monitor: NodeId,
        body: NodeId,
    },
    VarDecl(VarDecl),
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: Option<NodeId>,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: Option<NodeId>,
    },
    ForEach {
        var: FormalParam,
        iterable: NodeId,
        body: Option<NodeId>,
    },
    Switch {
        selector: NodeId,
        cases: Vec<SwitchCase>,
    },
    Return(Option<NodeId>),
    Break,
    Continue,
    Throw(NodeId),
    Try {
        body: NodeId,
        catches: Vec<CatchClause>,
        finally: Option<NodeId>,
    },
    MethodDecl(Box<MethodDecl>),
    ClassDecl(Box<ClassDecl>),
    Empty,
}

impl NodeKind {
    /// Short human-readable description used in fault messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            NodeKind::Literal(_) => "literal",
            NodeKind::Ident(_) | NodeKind::QualifiedName(_) => "name",
            NodeKind::ClassLiteral(_) => "class literal",
            NodeKind::FieldAccess { .. } => "field access",
            NodeKind::Index { .. } => "array index",
            NodeKind::Property { .. } => "property access",
            NodeKind::MethodCall { .. } => "method invocation",
            NodeKind::New { .. } => "allocation",
            NodeKind::NewArray { .. } => "array allocation",
            NodeKind::ArrayInit(_) => "array initializer",
            NodeKind::Cast { .. } => "cast",
            NodeKind::InstanceOf { .. } => "instanceof",
            NodeKind::Unary { .. } => "unary expression",
            NodeKind::Binary { .. } => "binary expression",
            NodeKind::Ternary { .. } => "conditional expression",
            NodeKind::Assign { .. } => "assignment",
            NodeKind::Block(_) => "block",
            NodeKind::Synchronized { .. } => "synchronized block",
            NodeKind::VarDecl(_) => "variable declaration",
            NodeKind::If { .. } => "if statement",
            NodeKind::While { .. } => "while statement",
            NodeKind::DoWhile { .. } => "do statement",
            NodeKind::For { .. } => "for statement",
            NodeKind::ForEach { .. } => "enhanced for statement",
            NodeKind::Switch { .. } => "switch statement",
            NodeKind::Return(_) => "return statement",
            NodeKind::Break => "break statement",
            NodeKind::Continue => "continue statement",
            NodeKind::Throw(_) => "throw statement",
            NodeKind::Try { .. } => "try statement",
            NodeKind::MethodDecl(_) => "method declaration",
            NodeKind::ClassDecl(_) => "class declaration",
            NodeKind::Empty => "empty statement",
        }
    }
}

/// A node: kind plus source span.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}
