//! Declarations and array construction.

use std::sync::Arc;

use super::{missing_node, Interpreter};
use crate::coercion::{convert, try_convert, Conversion};
use crate::errors::{strict, thrown, EvalError, EvalErrorKind, EvalResult};
use crate::host::ClassSpec;
use crate::value::{names, ArrayObject, Primitive, ReturnType, ScriptMethod, TypeRef, Value};
use zoola_ir::{
    ArrayDims, ClassDecl, MethodDecl, Modifiers, NodeId, NodeKind, ReturnTypeSyntax, TypeSyntax,
    VarDecl,
};

const TYPED_DECLARATION: &str = "Typed variable declaration";

impl Interpreter {
    pub(super) fn exec_var_decl(&mut self, decl: &VarDecl) -> EvalResult {
        self.declare_typed_variables(decl)
            .map_err(|err| err.with_note(TYPED_DECLARATION))?;
        Ok(Value::Void)
    }

    fn declare_typed_variables(&mut self, decl: &VarDecl) -> Result<(), EvalError> {
        let declared = self.resolve_type(&decl.ty)?;
        let scope = self.call_stack.top();
        for declarator in &decl.declarators {
            let ty = declared
                .clone()
                .with_dims(declared.dims.saturating_add(declarator.dims));
            let display = self.text(declarator.name);
            let value = match declarator.init {
                // A blank final takes exactly one later assignment.
                None if decl.modifiers.contains(Modifiers::FINAL) => Value::Void,
                None => ty.default_value(),
                Some(init) => {
                    let value = self.eval_initializer(init, &ty)?;
                    if value.is_void() {
                        return Err(EvalErrorKind::VoidInitializer {
                            name: display.to_owned(),
                        }
                        .into());
                    }
                    convert(
                        &*self.runtime.host,
                        &value,
                        &ty,
                        Conversion::Assignment,
                        &format!("initializer of '{display}'"),
                    )?
                }
            };
            self.scopes
                .declare_typed(scope, declarator.name, ty, decl.modifiers, value, display)?;
        }
        Ok(())
    }

    /// A declarator's initializer; a bare `{...}` is read against `ty`.
    fn eval_initializer(&mut self, init: NodeId, ty: &TypeRef) -> EvalResult {
        let tree = Arc::clone(&self.tree);
        match tree.get(init).map(|n| &n.kind) {
            Some(NodeKind::ArrayInit(items)) if ty.is_array() => {
                let base = ty.clone().with_dims(0);
                let dims = usize::from(ty.dims);
                self.eval_array_init(items, &base, dims, dims)
            }
            Some(NodeKind::ArrayInit(_)) => {
                Err(EvalErrorKind::InitializerLocation { position: 0 }.into())
            }
            _ => self.eval_expr(init),
        }
    }

    pub(super) fn exec_method_decl(&mut self, decl: &MethodDecl) -> EvalResult {
        let name = self.text(decl.name);
        let strict_java = self.config.strict_java;
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = param.ty.as_ref().map(|t| self.resolve_type(t)).transpose()?;
            if ty.is_none() && strict_java {
                return Err(strict(format!(
                    "Undeclared argument type, parameter: {} in method: {name}",
                    self.text(param.name)
                )));
            }
            params.push((param.name, ty));
        }
        let return_type = match &decl.return_type {
            ReturnTypeSyntax::Loose if strict_java => {
                return Err(strict(format!("Undeclared return type for method: {name}")))
            }
            ReturnTypeSyntax::Loose => ReturnType::Loose,
            ReturnTypeSyntax::Void => ReturnType::Void,
            ReturnTypeSyntax::Typed(ty) => ReturnType::Typed(self.resolve_type(ty)?),
        };
        let throws = decl
            .throws
            .iter()
            .map(|ty| self.resolve_type(ty))
            .collect::<Result<Vec<_>, _>>()?;
        let scope = self.call_stack.top();
        let method = Arc::new(ScriptMethod {
            name: decl.name,
            modifiers: decl.modifiers,
            params,
            return_type,
            throws,
            tree: Arc::clone(&self.tree),
            body: decl.body,
            scope,
        });
        let replaced = self.scopes.declare_method(scope, method)?;
        tracing::debug!(method = name, replaced, "method declared");
        Ok(Value::Void)
    }

    /// Generate the declared class once per node; later evaluations return
    /// the cached type.
    pub(super) fn exec_class_decl(&mut self, id: NodeId, decl: &ClassDecl) -> EvalResult {
        let cache = Arc::clone(&self.runtime.class_cache);
        let ty = cache.get_or_generate(self.tree.id(), id, || self.generate_class(decl))?;
        Ok(Value::Type(ty))
    }

    fn generate_class(&self, decl: &ClassDecl) -> Result<TypeRef, EvalError> {
        let super_type = decl
            .extends
            .as_ref()
            .map(|ty| self.resolve_type(ty))
            .transpose()?;
        let mut interfaces = Vec::with_capacity(decl.implements.len());
        for syntax in &decl.implements {
            let ty = self.resolve_type(syntax)?;
            let is_interface = ty
                .as_class()
                .is_some_and(|class| self.runtime.host.is_interface(class));
            if !is_interface {
                return Err(EvalErrorKind::NotInterface {
                    name: ty.to_string(),
                }
                .into());
            }
            interfaces.push(ty);
        }
        let spec = ClassSpec {
            name: self.text(decl.name),
            modifiers: decl.modifiers,
            is_interface: decl.is_interface,
            super_type,
            interfaces,
            tree: &self.tree,
            body: decl.body,
        };
        Ok(self.runtime.classes.generate(&spec)?)
    }

    /// `new T[a][b][]` or `new T[][]{...}`.
    pub(super) fn eval_new_array(&mut self, element: &TypeSyntax, dims: &ArrayDims) -> EvalResult {
        let declared = self.resolve_type(element)?;
        let base = declared.clone().with_dims(0);
        let total = dims.total() + usize::from(declared.dims);
        if let Some(init) = dims.initializer {
            let tree = Arc::clone(&self.tree);
            let node = tree.get(init).ok_or_else(|| missing_node(init))?;
            let NodeKind::ArrayInit(items) = &node.kind else {
                return Err(EvalErrorKind::InitializerLocation { position: 0 }.into());
            };
            return self.eval_array_init(items, &base, total, total);
        }
        let mut lengths = Vec::with_capacity(dims.defined.len());
        for (position, &dim) in dims.defined.iter().enumerate() {
            let value = self.eval_expr(dim)?;
            let length = value.unboxed().and_then(Primitive::as_int).ok_or_else(|| {
                EvalErrorKind::NonIntegralDimension {
                    found: value.type_name(),
                    position,
                }
            })?;
            lengths.push(length);
        }
        if let Some(negative) = lengths.iter().find(|&&len| len < 0) {
            let exception = self
                .runtime
                .host
                .new_exception(names::NEGATIVE_ARRAY_SIZE, &negative.to_string());
            return Err(thrown(exception));
        }
        Ok(allocate(&base, &lengths, total))
    }

    /// `{a, b, {c}}` against `base` with `dims` dimensions left of `total`.
    fn eval_array_init(
        &mut self,
        items: &[NodeId],
        base: &TypeRef,
        dims: usize,
        total: usize,
    ) -> EvalResult {
        let component = base.clone().with_dims(dim_count(dims.saturating_sub(1)));
        let tree = Arc::clone(&self.tree);
        let mut values = Vec::with_capacity(items.len());
        for (position, &item) in items.iter().enumerate() {
            let node = tree.get(item).ok_or_else(|| missing_node(item))?;
            let value = if let NodeKind::ArrayInit(inner) = &node.kind {
                if dims < 2 {
                    return Err(EvalErrorKind::InitializerLocation { position }.into());
                }
                self.eval_array_init(inner, base, dims - 1, total)?
            } else {
                let value = self.eval_expr(item)?;
                if value.is_void() {
                    return Err(EvalErrorKind::VoidInArrayInit { position }.into());
                }
                if dims >= 2 && !value.is_null() && value.as_array().is_none() {
                    return Err(EvalErrorKind::ArrayDimensionMismatch {
                        expected: total,
                        found: total - dims + 1,
                    }
                    .into());
                }
                let mode = if dims >= 2 {
                    Conversion::Assignment
                } else {
                    Conversion::Cast
                };
                try_convert(&*self.runtime.host, &value, &component, mode).ok_or_else(|| {
                    EvalErrorKind::ArrayInitElement {
                        element: value.type_name(),
                        array: component.array_of().to_string(),
                        position,
                    }
                })?
            };
            values.push(value);
        }
        Ok(Value::foreign(ArrayObject::from_values(component, values)))
    }
}

/// Nested allocation; dimensions past `lengths` stay `null`.
fn allocate(base: &TypeRef, lengths: &[i32], dims: usize) -> Value {
    let component = base.clone().with_dims(dim_count(dims.saturating_sub(1)));
    let Some((&first, rest)) = lengths.split_first() else {
        return Value::Null;
    };
    let len = usize::try_from(first).unwrap_or(0);
    if rest.is_empty() {
        return Value::foreign(ArrayObject::filled(component, len));
    }
    let items = (0..len)
        .map(|_| allocate(base, rest, dims.saturating_sub(1)))
        .collect();
    Value::foreign(ArrayObject::from_values(component, items))
}

fn dim_count(dims: usize) -> u8 {
    u8::try_from(dims).unwrap_or(u8::MAX)
}
