//! Binary operator semantics.
//!
//! [`binary_values`] applies rules that need both operands already
//! evaluated: string concatenation, the numeric promotion ladder for
//! primitive-like operands, and reference identity for everything else.
//! `instanceof` and the short-circuit operators are handled by the
//! evaluator because they need the unevaluated right operand.

use crate::errors::{
    invalid_operand, null_operand, void_operand, EvalError, EvalErrorKind, EvalResult,
};
use crate::value::{Primitive, Value};
use zoola_ir::{BinaryOp, PrimitiveKind};

/// Apply `op` to two evaluated operands.
pub fn binary_values(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if op == BinaryOp::Add && (left.as_str().is_some() || right.as_str().is_some()) {
        if left.is_void() || right.is_void() {
            return Err(void_operand(op.as_symbol()));
        }
        return Ok(concat(left, right));
    }

    if let (Some(l), Some(r)) = (left.unboxed(), right.unboxed()) {
        let wrapper_identity =
            matches!(op, BinaryOp::Eq | BinaryOp::NotEq) && left.is_wrapper() && right.is_wrapper();
        if !wrapper_identity {
            return binary_primitive(op, l, r).map(Value::Primitive);
        }
    }

    match op {
        BinaryOp::Eq => Ok(Value::bool(left.identity_eq(right))),
        BinaryOp::NotEq => Ok(Value::bool(!left.identity_eq(right))),
        _ if left.is_void() || right.is_void() => Err(void_operand(op.as_symbol())),
        _ if left.is_null() || right.is_null() => Err(null_operand(op.as_symbol())),
        _ => Err(EvalErrorKind::ObjectOperator {
            op: op.as_symbol(),
        }
        .into()),
    }
}

/// String concatenation of any two values.
pub fn concat(left: &Value, right: &Value) -> Value {
    Value::string(&format!("{left}{right}"))
}

/// Primitive equality as used by `switch` label matching.
pub fn primitive_equals(left: Primitive, right: Primitive) -> Result<bool, EvalError> {
    match binary_primitive(BinaryOp::Eq, left, right)? {
        Primitive::Bool(b) => Ok(b),
        _ => Ok(false),
    }
}

/// Both operands of a binary numeric operation at their promoted width.
enum Promoted {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

/// Binary numeric promotion.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float operands are already float-width"
)]
fn promote(l: Primitive, r: Primitive) -> Option<Promoted> {
    use PrimitiveKind::{Double, Float, Long};
    let (lk, rk) = (l.kind(), r.kind());
    if !lk.is_numeric() || !rk.is_numeric() {
        return None;
    }
    let promoted = if lk == Double || rk == Double {
        Promoted::Double(l.as_f64()?, r.as_f64()?)
    } else if lk == Float || rk == Float {
        Promoted::Float(l.as_f64()? as f32, r.as_f64()? as f32)
    } else if lk == Long || rk == Long {
        Promoted::Long(l.as_i64()?, r.as_i64()?)
    } else {
        Promoted::Int(l.as_int()?, r.as_int()?)
    };
    Some(promoted)
}

/// Apply `op` to two primitives following the promotion ladder.
pub fn binary_primitive(op: BinaryOp, l: Primitive, r: Primitive) -> Result<Primitive, EvalError> {
    match (l, r) {
        (Primitive::Bool(a), Primitive::Bool(b)) => bool_op(op, a, b),
        (Primitive::Bool(_), _) | (_, Primitive::Bool(_)) => {
            Err(EvalErrorKind::IncompatibleOperands {
                op: op.as_symbol(),
                left: l.kind().keyword().to_owned(),
                right: r.kind().keyword().to_owned(),
            }
            .into())
        }
        _ if op.is_shift() => shift(op, l, r),
        _ => match promote(l, r) {
            Some(Promoted::Int(a, b)) => int_op(op, a, b),
            Some(Promoted::Long(a, b)) => long_op(op, a, b),
            Some(Promoted::Float(a, b)) => float_op(op, a, b),
            Some(Promoted::Double(a, b)) => double_op(op, a, b),
            None => Err(invalid_operand(op.as_symbol(), l.kind().keyword())),
        },
    }
}

fn bool_op(op: BinaryOp, a: bool, b: bool) -> Result<Primitive, EvalError> {
    let result = match op {
        BinaryOp::And | BinaryOp::BitAnd => a & b,
        BinaryOp::Or | BinaryOp::BitOr => a | b,
        BinaryOp::BitXor | BinaryOp::NotEq => a ^ b,
        BinaryOp::Eq => a == b,
        _ => return Err(invalid_operand(op.as_symbol(), "boolean")),
    };
    Ok(Primitive::Bool(result))
}

#[cold]
fn divide_by_zero() -> EvalError {
    EvalErrorKind::Arithmetic {
        message: "/ by zero",
    }
    .into()
}

fn int_op(op: BinaryOp, a: i32, b: i32) -> Result<Primitive, EvalError> {
    let result = match op {
        BinaryOp::Add => Primitive::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Primitive::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Primitive::Int(a.wrapping_mul(b)),
        BinaryOp::Div if b == 0 => return Err(divide_by_zero()),
        BinaryOp::Div => Primitive::Int(a.wrapping_div(b)),
        BinaryOp::Mod if b == 0 => return Err(divide_by_zero()),
        BinaryOp::Mod => Primitive::Int(a.wrapping_rem(b)),
        BinaryOp::BitAnd => Primitive::Int(a & b),
        BinaryOp::BitOr => Primitive::Int(a | b),
        BinaryOp::BitXor => Primitive::Int(a ^ b),
        BinaryOp::Eq => Primitive::Bool(a == b),
        BinaryOp::NotEq => Primitive::Bool(a != b),
        BinaryOp::Lt => Primitive::Bool(a < b),
        BinaryOp::LtEq => Primitive::Bool(a <= b),
        BinaryOp::Gt => Primitive::Bool(a > b),
        BinaryOp::GtEq => Primitive::Bool(a >= b),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
            return Err(invalid_operand(op.as_symbol(), "int"))
        }
    };
    Ok(result)
}

fn long_op(op: BinaryOp, a: i64, b: i64) -> Result<Primitive, EvalError> {
    let result = match op {
        BinaryOp::Add => Primitive::Long(a.wrapping_add(b)),
        BinaryOp::Sub => Primitive::Long(a.wrapping_sub(b)),
        BinaryOp::Mul => Primitive::Long(a.wrapping_mul(b)),
        BinaryOp::Div if b == 0 => return Err(divide_by_zero()),
        BinaryOp::Div => Primitive::Long(a.wrapping_div(b)),
        BinaryOp::Mod if b == 0 => return Err(divide_by_zero()),
        BinaryOp::Mod => Primitive::Long(a.wrapping_rem(b)),
        BinaryOp::BitAnd => Primitive::Long(a & b),
        BinaryOp::BitOr => Primitive::Long(a | b),
        BinaryOp::BitXor => Primitive::Long(a ^ b),
        BinaryOp::Eq => Primitive::Bool(a == b),
        BinaryOp::NotEq => Primitive::Bool(a != b),
        BinaryOp::Lt => Primitive::Bool(a < b),
        BinaryOp::LtEq => Primitive::Bool(a <= b),
        BinaryOp::Gt => Primitive::Bool(a > b),
        BinaryOp::GtEq => Primitive::Bool(a >= b),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
            return Err(invalid_operand(op.as_symbol(), "long"))
        }
    };
    Ok(result)
}

#[expect(clippy::float_cmp, reason = "operator semantics are exact comparison")]
fn float_op(op: BinaryOp, a: f32, b: f32) -> Result<Primitive, EvalError> {
    let result = match op {
        BinaryOp::Add => Primitive::Float(a + b),
        BinaryOp::Sub => Primitive::Float(a - b),
        BinaryOp::Mul => Primitive::Float(a * b),
        BinaryOp::Div => Primitive::Float(a / b),
        BinaryOp::Mod => Primitive::Float(a % b),
        BinaryOp::Eq => Primitive::Bool(a == b),
        BinaryOp::NotEq => Primitive::Bool(a != b),
        BinaryOp::Lt => Primitive::Bool(a < b),
        BinaryOp::LtEq => Primitive::Bool(a <= b),
        BinaryOp::Gt => Primitive::Bool(a > b),
        BinaryOp::GtEq => Primitive::Bool(a >= b),
        _ => return Err(invalid_operand(op.as_symbol(), "float")),
    };
    Ok(result)
}

#[expect(clippy::float_cmp, reason = "operator semantics are exact comparison")]
fn double_op(op: BinaryOp, a: f64, b: f64) -> Result<Primitive, EvalError> {
    let result = match op {
        BinaryOp::Add => Primitive::Double(a + b),
        BinaryOp::Sub => Primitive::Double(a - b),
        BinaryOp::Mul => Primitive::Double(a * b),
        BinaryOp::Div => Primitive::Double(a / b),
        BinaryOp::Mod => Primitive::Double(a % b),
        BinaryOp::Eq => Primitive::Bool(a == b),
        BinaryOp::NotEq => Primitive::Bool(a != b),
        BinaryOp::Lt => Primitive::Bool(a < b),
        BinaryOp::LtEq => Primitive::Bool(a <= b),
        BinaryOp::Gt => Primitive::Bool(a > b),
        BinaryOp::GtEq => Primitive::Bool(a >= b),
        _ => return Err(invalid_operand(op.as_symbol(), "double")),
    };
    Ok(result)
}

/// Shifts promote only the left operand; the distance is masked to the
/// left operand's width.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    reason = "shift distances are masked and unsigned shifts reinterpret bits"
)]
fn shift(op: BinaryOp, l: Primitive, r: Primitive) -> Result<Primitive, EvalError> {
    let Some(distance) = r.as_i64() else {
        return Err(invalid_operand(op.as_symbol(), r.kind().keyword()));
    };
    if let Some(a) = l.as_int() {
        let n = (distance & 0x1f) as u32;
        let result = match op {
            BinaryOp::Shl => a.wrapping_shl(n),
            BinaryOp::Shr => a.wrapping_shr(n),
            _ => ((a as u32) >> n) as i32,
        };
        return Ok(Primitive::Int(result));
    }
    if let Primitive::Long(a) = l {
        let n = (distance & 0x3f) as u32;
        let result = match op {
            BinaryOp::Shl => a.wrapping_shl(n),
            BinaryOp::Shr => a.wrapping_shr(n),
            _ => ((a as u64) >> n) as i64,
        };
        return Ok(Primitive::Long(result));
    }
    Err(invalid_operand(op.as_symbol(), l.kind().keyword()))
}
