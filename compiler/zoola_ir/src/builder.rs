//! Programmatic tree construction.
//!
//! Parsers and embedders that synthesize code build trees through
//! [`AstBuilder`]. Every helper allocates one node at the builder's current
//! span (see [`AstBuilder::set_span`]).

use crate::ast::{
    ArrayDims, AssignOp, BaseTypeSyntax, BinaryOp, CatchClause, ClassDecl, Declarator,
    FormalParam, Literal, MethodDecl, Modifiers, NodeKind, PrimitiveKind, ReturnTypeSyntax,
    SwitchCase, TypeSyntax, UnaryOp, VarDecl,
};
use crate::{Name, NodeArena, NodeId, SharedInterner, Span, SyntaxTree};

pub struct AstBuilder {
    arena: NodeArena,
    interner: SharedInterner,
    span: Span,
}

impl AstBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        AstBuilder {
            arena: NodeArena::new(),
            interner,
            span: Span::DUMMY,
        }
    }

    /// Span given to subsequently allocated nodes.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind, self.span)
    }

    /// Freeze the arena with `root` as the entry node.
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree::new(self.arena, root)
    }

    /// Parse a written type such as `int`, `String[]` or `java.util.Map`.
    pub fn ty(&self, text: &str) -> TypeSyntax {
        let mut base = text.trim();
        let mut dims = 0u8;
        while let Some(rest) = base.strip_suffix("[]") {
            base = rest.trim_end();
            dims = dims.saturating_add(1);
        }
        let base = match PrimitiveKind::from_keyword(base) {
            Some(kind) => BaseTypeSyntax::Primitive(kind),
            None => BaseTypeSyntax::Named(base.split('.').map(|s| self.name(s)).collect()),
        };
        TypeSyntax { base, dims }
    }

    /// Formal parameter; `ty` of `None` is untyped.
    pub fn param(&self, name: &str, ty: Option<&str>) -> FormalParam {
        FormalParam {
            name: self.name(name),
            ty: ty.map(|t| self.ty(t)),
        }
    }

    // Literals

    pub fn literal(&mut self, lit: Literal) -> NodeId {
        self.alloc(NodeKind::Literal(lit))
    }

    pub fn bool(&mut self, v: bool) -> NodeId {
        self.literal(Literal::Bool(v))
    }

    pub fn char(&mut self, c: char) -> NodeId {
        let mut buf = [0u16; 2];
        let unit = c.encode_utf16(&mut buf)[0];
        self.literal(Literal::Char(unit))
    }

    pub fn int(&mut self, v: i32) -> NodeId {
        self.literal(Literal::Int(v))
    }

    pub fn long(&mut self, v: i64) -> NodeId {
        self.literal(Literal::Long(v))
    }

    pub fn float(&mut self, v: f32) -> NodeId {
        self.literal(Literal::Float(v))
    }

    pub fn double(&mut self, v: f64) -> NodeId {
        self.literal(Literal::Double(v))
    }

    pub fn string(&mut self, text: &str) -> NodeId {
        let name = self.name(text);
        self.literal(Literal::Str(name))
    }

    pub fn null(&mut self) -> NodeId {
        self.literal(Literal::Null)
    }

    pub fn void(&mut self) -> NodeId {
        self.literal(Literal::Void)
    }

    // Names and primary suffixes

    pub fn ident(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::Ident(name))
    }

    /// `a.b.c`; a single segment becomes a plain identifier.
    pub fn qualified(&mut self, dotted: &str) -> NodeId {
        let segments: Vec<Name> = dotted.split('.').map(|s| self.name(s)).collect();
        match segments.as_slice() {
            [single] => self.alloc(NodeKind::Ident(*single)),
            _ => self.alloc(NodeKind::QualifiedName(segments)),
        }
    }

    pub fn class_literal(&mut self, ty: &str) -> NodeId {
        let ty = self.ty(ty);
        self.alloc(NodeKind::ClassLiteral(ty))
    }

    pub fn field(&mut self, target: NodeId, field: &str) -> NodeId {
        let field = self.name(field);
        self.alloc(NodeKind::FieldAccess { target, field })
    }

    pub fn index(&mut self, target: NodeId, index: NodeId) -> NodeId {
        self.alloc(NodeKind::Index { target, index })
    }

    pub fn property(&mut self, target: NodeId, key: NodeId) -> NodeId {
        self.alloc(NodeKind::Property { target, key })
    }

    /// Unqualified call `name(args)`.
    pub fn call(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::MethodCall {
            target: None,
            name,
            args,
        })
    }

    /// Qualified call `target.name(args)`.
    pub fn method_call(&mut self, target: NodeId, name: &str, args: Vec<NodeId>) -> NodeId {
        let name = self.name(name);
        self.alloc(NodeKind::MethodCall {
            target: Some(target),
            name,
            args,
        })
    }

    pub fn new_object(&mut self, ty: &str, args: Vec<NodeId>) -> NodeId {
        let ty = self.ty(ty);
        self.alloc(NodeKind::New { ty, args })
    }

    /// `new element[d0][d1]...[]...`
    pub fn new_array(&mut self, element: &str, defined: Vec<NodeId>, undefined: u8) -> NodeId {
        let element = self.ty(element);
        self.alloc(NodeKind::NewArray {
            element,
            dims: ArrayDims {
                defined,
                undefined,
                initializer: None,
            },
        })
    }

    /// `new element[]...[] { ... }` with `dims` empty brackets.
    pub fn new_array_init(&mut self, element: &str, dims: u8, init: NodeId) -> NodeId {
        let element = self.ty(element);
        self.alloc(NodeKind::NewArray {
            element,
            dims: ArrayDims {
                defined: Vec::new(),
                undefined: dims,
                initializer: Some(init),
            },
        })
    }

    pub fn array_init(&mut self, items: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::ArrayInit(items))
    }

    // Operators

    pub fn cast(&mut self, ty: &str, expr: NodeId) -> NodeId {
        let ty = self.ty(ty);
        self.alloc(NodeKind::Cast { ty, expr })
    }

    pub fn instance_of(&mut self, expr: NodeId, ty: &str) -> NodeId {
        let ty = self.ty(ty);
        self.alloc(NodeKind::InstanceOf { expr, ty })
    }

    /// Prefix unary operator.
    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary {
            op,
            operand,
            postfix: false,
        })
    }

    /// Postfix `++`/`--`.
    pub fn postfix(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(NodeKind::Unary {
            op,
            operand,
            postfix: true,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, left, right })
    }

    pub fn ternary(&mut self, cond: NodeId, then_expr: NodeId, else_expr: NodeId) -> NodeId {
        self.alloc(NodeKind::Ternary {
            cond,
            then_expr,
            else_expr,
        })
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.assign_op(AssignOp::Assign, target, value)
    }

    pub fn assign_op(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Assign { op, target, value })
    }

    // Statements

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Block(stmts))
    }

    pub fn synchronized(&mut self, monitor: NodeId, body: NodeId) -> NodeId {
        self.alloc(NodeKind::Synchronized { monitor, body })
    }

    /// Single-declarator typed variable declaration.
    pub fn var(&mut self, ty: &str, name: &str, init: Option<NodeId>) -> NodeId {
        let ty = self.ty(ty);
        let declarator = Declarator {
            name: self.name(name),
            dims: 0,
            init,
        };
        self.var_decl(Modifiers::empty(), ty, vec![declarator])
    }

    pub fn declarator(&self, name: &str, dims: u8, init: Option<NodeId>) -> Declarator {
        Declarator {
            name: self.name(name),
            dims,
            init,
        }
    }

    pub fn var_decl(
        &mut self,
        modifiers: Modifiers,
        ty: TypeSyntax,
        declarators: Vec<Declarator>,
    ) -> NodeId {
        self.alloc(NodeKind::VarDecl(VarDecl {
            modifiers,
            ty,
            declarators,
        }))
    }

    pub fn if_(&mut self, cond: NodeId, then_branch: NodeId, else_branch: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_(&mut self, cond: NodeId, body: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::While { cond, body })
    }

    pub fn do_while(&mut self, body: NodeId, cond: NodeId) -> NodeId {
        self.alloc(NodeKind::DoWhile { body, cond })
    }

    pub fn for_(
        &mut self,
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.alloc(NodeKind::For {
            init,
            cond,
            update,
            body,
        })
    }

    pub fn for_each(&mut self, var: FormalParam, iterable: NodeId, body: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::ForEach {
            var,
            iterable,
            body,
        })
    }

    pub fn switch(&mut self, selector: NodeId, cases: Vec<SwitchCase>) -> NodeId {
        self.alloc(NodeKind::Switch { selector, cases })
    }

    pub fn case(label: NodeId, body: Vec<NodeId>) -> SwitchCase {
        SwitchCase {
            label: Some(label),
            body,
        }
    }

    pub fn default_case(body: Vec<NodeId>) -> SwitchCase {
        SwitchCase { label: None, body }
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Return(value))
    }

    pub fn brk(&mut self) -> NodeId {
        self.alloc(NodeKind::Break)
    }

    pub fn cont(&mut self) -> NodeId {
        self.alloc(NodeKind::Continue)
    }

    pub fn throw(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Throw(value))
    }

    pub fn try_(&mut self, body: NodeId, catches: Vec<CatchClause>, finally: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Try {
            body,
            catches,
            finally,
        })
    }

    pub fn catch(param: FormalParam, body: NodeId) -> CatchClause {
        CatchClause { param, body }
    }

    /// Method declaration. `ret` follows the source spelling: `None` for no
    /// return type, `Some("void")`, or a type.
    pub fn method(
        &mut self,
        name: &str,
        ret: Option<&str>,
        params: Vec<FormalParam>,
        body: NodeId,
    ) -> NodeId {
        let return_type = match ret {
            None => ReturnTypeSyntax::Loose,
            Some("void") => ReturnTypeSyntax::Void,
            Some(t) => ReturnTypeSyntax::Typed(self.ty(t)),
        };
        let decl = MethodDecl {
            name: self.name(name),
            modifiers: Modifiers::empty(),
            return_type,
            params,
            throws: Vec::new(),
            body: Some(body),
        };
        self.method_decl(decl)
    }

    pub fn method_decl(&mut self, decl: MethodDecl) -> NodeId {
        self.alloc(NodeKind::MethodDecl(Box::new(decl)))
    }

    pub fn class_decl(&mut self, decl: ClassDecl) -> NodeId {
        self.alloc(NodeKind::ClassDecl(Box::new(decl)))
    }

    pub fn empty(&mut self) -> NodeId {
        self.alloc(NodeKind::Empty)
    }
}
