//! Type conversion between values and declared types.
//!
//! Two contexts share one rule set:
//! - [`Conversion::Assignment`]: typed slots, parameters, return values,
//!   array elements. Widening only, plus narrowing of an int-width value
//!   that fits the target.
//! - [`Conversion::Cast`]: `(T) e`, numeric narrowing allowed.
//!
//! Reference values convert when their runtime type is assignable to the
//! target; the host decides class assignability.

use crate::errors::{type_mismatch, EvalError, EvalErrorKind, EvalResult};
use crate::host::HostResolver;
use crate::value::{is_widening, names, BaseType, ClassRef, TypeRef, Value};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Conversion {
    Assignment,
    Cast,
}

/// Whether a value of type `source` may be stored where `target` is expected.
pub fn is_assignable(host: &dyn HostResolver, target: &TypeRef, source: &TypeRef) -> bool {
    if target == source {
        return true;
    }
    if target.dims == 0 {
        return match (&target.base, &source.base) {
            (BaseType::PrimitiveMarker, _) => source.dims == 0 && source.as_primitive().is_some(),
            (BaseType::Primitive(t), BaseType::Primitive(s)) if source.dims == 0 => {
                is_widening(*s, *t)
            }
            (BaseType::Primitive(_), _) => false,
            (BaseType::Class(t), _) if source.dims > 0 => t.is(names::OBJECT),
            (BaseType::Class(t), BaseType::Primitive(s)) => {
                t.is(s.wrapper_name())
                    || host.is_assignable(t, &ClassRef::new(s.wrapper_name()))
            }
            (BaseType::Class(t), BaseType::Class(s)) => host.is_assignable(t, s),
            (BaseType::Class(t), BaseType::PrimitiveMarker) => t.is(names::OBJECT),
        };
    }
    if source.dims < target.dims {
        return false;
    }
    if source.dims > target.dims {
        // Object[] holds any array of higher rank.
        return matches!(&target.base, BaseType::Class(c) if c.is(names::OBJECT));
    }
    match (&target.base, &source.base) {
        (BaseType::Primitive(t), BaseType::Primitive(s)) => t == s,
        (BaseType::Class(t), BaseType::Class(s)) => host.is_assignable(t, s),
        _ => false,
    }
}

/// `value instanceof target`.
pub fn instance_of(host: &dyn HostResolver, value: &Value, target: &TypeRef) -> bool {
    match value {
        Value::Null => false,
        Value::Primitive(_) | Value::Void => {
            matches!(target.base, BaseType::PrimitiveMarker) && target.dims == 0
        }
        other => other
            .value_type()
            .is_some_and(|source| is_assignable(host, target, &source)),
    }
}

/// Convert `value` to `target`, or `None` when the conversion is illegal.
pub fn try_convert(
    host: &dyn HostResolver,
    value: &Value,
    target: &TypeRef,
    mode: Conversion,
) -> Option<Value> {
    if let Some(kind) = target.as_primitive() {
        let p = value.unboxed()?;
        let converted = match mode {
            Conversion::Assignment => p.assign_to(kind),
            Conversion::Cast => p.convert(kind),
        };
        return converted.map(Value::Primitive);
    }
    match value {
        Value::Void => None,
        Value::Null => Some(Value::Null),
        Value::Primitive(p) => {
            let source = TypeRef::primitive(p.kind());
            if is_assignable(host, target, &source) {
                return Some(value.clone());
            }
            // (Long) 5 and Long l = 5 box through the numeric conversion.
            let wrapped = target.as_class().and_then(|class| {
                zoola_ir::PrimitiveKind::ALL
                    .into_iter()
                    .find(|k| class.is(k.wrapper_name()))
            })?;
            let converted = match mode {
                Conversion::Assignment => p.assign_to(wrapped),
                Conversion::Cast => p.convert(wrapped),
            };
            converted.map(Value::Primitive)
        }
        other => {
            let source = other.value_type()?;
            is_assignable(host, target, &source).then(|| other.clone())
        }
    }
}

/// Convert `value` to `target`, describing the failure with `context`.
pub fn convert(
    host: &dyn HostResolver,
    value: &Value,
    target: &TypeRef,
    mode: Conversion,
    context: &str,
) -> EvalResult {
    if value.is_void() {
        return Err(EvalErrorKind::VoidAssignment.into());
    }
    try_convert(host, value, target, mode)
        .ok_or_else(|| mismatch(context, target, value))
}

#[cold]
fn mismatch(context: &str, target: &TypeRef, value: &Value) -> EvalError {
    type_mismatch(context, &target.to_string(), &value.type_name())
}
