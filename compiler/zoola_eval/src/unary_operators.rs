//! Unary operator semantics.

use crate::errors::{invalid_operand, null_operand, void_operand, EvalError, EvalResult};
use crate::value::{Primitive, Value};
use zoola_ir::UnaryOp;

/// Apply `op` to an evaluated operand. For `++`/`--` this computes the
/// updated value; writing it back is the caller's job.
pub fn unary_value(op: UnaryOp, operand: &Value) -> EvalResult {
    match operand {
        Value::Void => Err(void_operand(op.as_symbol())),
        Value::Null => Err(null_operand(op.as_symbol())),
        other => match other.unboxed() {
            Some(p) => unary_primitive(op, p).map(Value::Primitive),
            None => Err(invalid_operand(op.as_symbol(), &other.type_name())),
        },
    }
}

/// Unary promotion plus the operator. `++`/`--` narrow back to the
/// operand's own width (byte stays byte, char stays char).
pub fn unary_primitive(op: UnaryOp, p: Primitive) -> Result<Primitive, EvalError> {
    let kind = p.kind();
    let invalid = || invalid_operand(op.as_symbol(), kind.keyword());
    let result = match (op, p) {
        (UnaryOp::Not, Primitive::Bool(b)) => Primitive::Bool(!b),
        (_, Primitive::Bool(_)) | (UnaryOp::Not, _) => return Err(invalid()),

        (UnaryOp::Neg, Primitive::Long(l)) => Primitive::Long(l.wrapping_neg()),
        (UnaryOp::Neg, Primitive::Float(f)) => Primitive::Float(-f),
        (UnaryOp::Neg, Primitive::Double(d)) => Primitive::Double(-d),
        (UnaryOp::Neg, other) => Primitive::Int(other.as_int().ok_or_else(invalid)?.wrapping_neg()),

        (UnaryOp::Plus, Primitive::Long(_) | Primitive::Float(_) | Primitive::Double(_)) => p,
        (UnaryOp::Plus, other) => Primitive::Int(other.as_int().ok_or_else(invalid)?),

        (UnaryOp::BitNot, Primitive::Long(l)) => Primitive::Long(!l),
        (UnaryOp::BitNot, other) => Primitive::Int(!other.as_int().ok_or_else(invalid)?),

        (UnaryOp::Incr | UnaryOp::Decr, _) => step(op == UnaryOp::Incr, p).ok_or_else(invalid)?,
    };
    Ok(result)
}

fn step(up: bool, p: Primitive) -> Option<Primitive> {
    let delta: i32 = if up { 1 } else { -1 };
    match p {
        Primitive::Long(l) => Some(Primitive::Long(l.wrapping_add(i64::from(delta)))),
        Primitive::Float(f) => Some(Primitive::Float(f + if up { 1.0 } else { -1.0 })),
        Primitive::Double(d) => Some(Primitive::Double(d + f64::from(delta))),
        Primitive::Bool(_) => None,
        other => Primitive::Int(other.as_int()?.wrapping_add(delta)).convert(other.kind()),
    }
}
