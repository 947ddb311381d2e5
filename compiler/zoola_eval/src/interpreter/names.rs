//! Name resolution, member access and left-value resolution.
//!
//! A simple identifier is looked up along the scope chain, then offered to
//! the host as a type name. A dotted name starts from a variable when its
//! first segment is one; otherwise the longest prefix the host knows as a
//! type is taken and the remaining segments are static field reads.

use std::sync::Arc;

use super::{missing_node, Interpreter};
use crate::errors::{
    not_assignable, undefined_name, undefined_variable, EvalError, EvalErrorKind, EvalResult,
    HostError,
};
use crate::lvalue::LeftValue;
use crate::value::{Primitive, TypeRef, Value};
use zoola_ir::{BaseTypeSyntax, Name, NodeId, NodeKind, TypeSyntax};

impl Interpreter {
    /// Resolve a written type through the host.
    pub(crate) fn resolve_type(&self, syntax: &TypeSyntax) -> Result<TypeRef, EvalError> {
        let base = match &syntax.base {
            BaseTypeSyntax::Primitive(kind) => TypeRef::primitive(*kind),
            BaseTypeSyntax::Named(segments) => {
                let name = self.join(segments);
                self.runtime.host.resolve_type(&name).map_err(|err| match err {
                    HostError::NotFound(_) => undefined_name(&name),
                    other => other.into(),
                })?
            }
        };
        let dims = base.dims.saturating_add(syntax.dims);
        Ok(base.with_dims(dims))
    }

    pub(super) fn eval_ident(&self, name: Name) -> EvalResult {
        if let Some(slot) = self.scopes.lookup(self.call_stack.top(), name)? {
            return Ok(slot.value.clone());
        }
        let text = self.text(name);
        if let Ok(ty) = self.runtime.host.resolve_type(text) {
            return Ok(Value::Type(ty));
        }
        if self.config.strict_java {
            return Err(undefined_variable(text));
        }
        Ok(Value::Void)
    }

    pub(super) fn eval_qualified(&self, segments: &[Name]) -> EvalResult {
        let Some((&first, rest)) = segments.split_first() else {
            return Err(undefined_name(""));
        };
        if let Some(slot) = self.scopes.lookup(self.call_stack.top(), first)? {
            let mut value = slot.value.clone();
            for &field in rest {
                value = self.field_of(value, field)?;
            }
            return Ok(value);
        }
        for split in (1..=segments.len()).rev() {
            let prefix = self.join(&segments[..split]);
            if let Ok(ty) = self.runtime.host.resolve_type(&prefix) {
                let mut value = Value::Type(ty);
                for &field in &segments[split..] {
                    value = self.field_of(value, field)?;
                }
                return Ok(value);
            }
        }
        Err(undefined_name(&self.join(segments)))
    }

    pub(super) fn eval_field_access(&mut self, target: NodeId, field: Name) -> EvalResult {
        let value = self.eval_expr(target)?;
        self.field_of(value, field)
    }

    /// `target.field` on an evaluated target.
    fn field_of(&self, target: Value, field: Name) -> EvalResult {
        let name = self.text(field);
        check_dereference(&target, name)?;
        if field == self.names.length {
            if let Some(array) = target.as_array() {
                return Ok(Value::int(i32::try_from(array.len()).unwrap_or(i32::MAX)));
            }
        }
        Ok(self.runtime.host.get_field(&target, name)?)
    }

    pub(super) fn eval_index(&mut self, target: NodeId, index: NodeId) -> EvalResult {
        let element = self.array_element(target, index)?;
        self.read_left_value(&element)
    }

    pub(super) fn eval_property(&mut self, target: NodeId, key: NodeId) -> EvalResult {
        let location = self.property(target, key)?;
        self.read_left_value(&location)
    }

    fn array_element(&mut self, target: NodeId, index: NodeId) -> Result<LeftValue, EvalError> {
        let value = self.eval_expr(target)?;
        let array = match &value {
            Value::Foreign(obj) if obj.as_array().is_some() => obj.clone(),
            Value::Void => return Err(EvalErrorKind::VoidDereference { name: "[]".to_owned() }.into()),
            Value::Null => {
                return Err(EvalErrorKind::NullDereference {
                    what: "array index".to_owned(),
                }
                .into())
            }
            other => {
                return Err(EvalErrorKind::NotAnArray {
                    found: other.type_name(),
                }
                .into())
            }
        };
        let index_value = self.eval_expr(index)?;
        let index = index_value
            .unboxed()
            .and_then(Primitive::as_int)
            .ok_or_else(|| EvalErrorKind::NonIntegralIndex {
                found: index_value.type_name(),
            })?;
        Ok(LeftValue::ArrayElement { array, index })
    }

    fn property(&mut self, target: NodeId, key: NodeId) -> Result<LeftValue, EvalError> {
        let target = self.eval_expr(target)?;
        let key_value = self.eval_expr(key)?;
        let Some(key) = key_value.as_str() else {
            return Err(EvalErrorKind::PropertyKey {
                found: key_value.type_name(),
            }
            .into());
        };
        check_dereference(&target, key)?;
        Ok(LeftValue::Property {
            key: key.to_owned(),
            target,
        })
    }

    /// Resolve an assignment target.
    pub(crate) fn to_left_value(&mut self, id: NodeId) -> Result<LeftValue, EvalError> {
        let tree = Arc::clone(&self.tree);
        let node = tree.get(id).ok_or_else(|| missing_node(id))?;
        match &node.kind {
            NodeKind::Ident(name) => Ok(LeftValue::Variable {
                scope: self.call_stack.top(),
                name: *name,
            }),
            NodeKind::QualifiedName(segments) => match segments.split_last() {
                Some((&last, prefix)) if !prefix.is_empty() => {
                    let target = self.eval_qualified(prefix)?;
                    self.field_location(target, last)
                }
                Some((&only, _)) => Ok(LeftValue::Variable {
                    scope: self.call_stack.top(),
                    name: only,
                }),
                None => Err(not_assignable("empty name")),
            },
            NodeKind::FieldAccess { target, field } => {
                let target = self.eval_expr(*target)?;
                self.field_location(target, *field)
            }
            NodeKind::Index { target, index } => self.array_element(*target, *index),
            NodeKind::Property { target, key } => self.property(*target, *key),
            other => Err(not_assignable(other.describe())),
        }
    }

    fn field_location(&self, target: Value, field: Name) -> Result<LeftValue, EvalError> {
        let name = self.text(field);
        check_dereference(&target, name)?;
        if field == self.names.length && target.as_array().is_some() {
            return Err(not_assignable("array length"));
        }
        if name == "class" {
            return Err(not_assignable("class literal"));
        }
        Ok(LeftValue::Field {
            target,
            name: name.to_owned(),
        })
    }

    fn join(&self, segments: &[Name]) -> String {
        segments
            .iter()
            .map(|&s| self.text(s))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Member access on `void`, `null` or a primitive is a fault.
fn check_dereference(target: &Value, member: &str) -> Result<(), EvalError> {
    let kind = match target {
        Value::Void => EvalErrorKind::VoidDereference {
            name: member.to_owned(),
        },
        Value::Null => EvalErrorKind::NullDereference {
            what: format!("access of '{member}'"),
        },
        Value::Primitive(_) => EvalErrorKind::PrimitiveDereference {
            name: member.to_owned(),
        },
        _ => return Ok(()),
    };
    Err(kind.into())
}
