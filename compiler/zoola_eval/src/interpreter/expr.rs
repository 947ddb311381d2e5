//! Expression rules: literals, operators, assignment, casts, allocation.

use super::Interpreter;
use crate::coercion::{convert, instance_of, Conversion};
use crate::errors::{null_operand, type_mismatch, void_operand, EvalErrorKind, EvalResult};
use crate::lvalue::LeftValue;
use crate::operators::binary_values;
use crate::unary_operators::unary_value;
use crate::value::{Primitive, TypeRef, Value};
use zoola_ir::{AssignOp, BinaryOp, Literal, NodeId, TypeSyntax, UnaryOp};

impl Interpreter {
    pub(super) fn eval_literal(&self, lit: Literal) -> EvalResult {
        let value = match lit {
            Literal::Bool(b) => Value::bool(b),
            Literal::Char(c) => Value::Primitive(Primitive::Char(c)),
            Literal::Int(i) => Value::int(i),
            Literal::Long(l) => Value::long(l),
            Literal::Float(f) => Value::float(f),
            Literal::Double(d) => Value::double(d),
            Literal::Str(name) => self.runtime.strings.literal(name, &self.runtime.interner),
            Literal::Null => Value::Null,
            Literal::Void => Value::Void,
        };
        Ok(value)
    }

    pub(super) fn eval_unary(&mut self, op: UnaryOp, operand: NodeId, postfix: bool) -> EvalResult {
        if !op.is_update() {
            let value = self.eval_expr(operand)?;
            return unary_value(op, &value);
        }
        let target = self.to_left_value(operand)?;
        let old = self.read_left_value(&target)?;
        let updated = unary_value(op, &old)?;
        let stored = self.assign_left_value(&target, updated)?;
        Ok(if postfix { old } else { stored })
    }

    pub(super) fn eval_binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> EvalResult {
        let lhs = self.eval_expr(left)?;
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            // `false && x` and `true || x` never evaluate `x`.
            let decided = op == BinaryOp::Or;
            if lhs.as_bool() == Some(decided) {
                return Ok(Value::bool(decided));
            }
        }
        let rhs = self.eval_expr(right)?;
        binary_values(op, &lhs, &rhs)
    }

    pub(super) fn eval_instance_of(&mut self, expr: NodeId, ty: &TypeSyntax) -> EvalResult {
        let value = self.eval_expr(expr)?;
        let target = self.resolve_type(ty)?;
        Ok(Value::bool(instance_of(&*self.runtime.host, &value, &target)))
    }

    pub(super) fn eval_ternary(
        &mut self,
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    ) -> EvalResult {
        if self.eval_condition(cond)? {
            self.eval_expr(then_expr)
        } else {
            self.eval_expr(else_expr)
        }
    }

    pub(super) fn eval_cast(&mut self, ty: &TypeSyntax, expr: NodeId) -> EvalResult {
        let target = self.resolve_type(ty)?;
        let value = self.eval_expr(expr)?;
        if value.is_void() {
            return Err(void_operand("cast"));
        }
        convert(&*self.runtime.host, &value, &target, Conversion::Cast, "cast")
    }

    pub(super) fn eval_new(&mut self, ty: &TypeSyntax, args: &[NodeId]) -> EvalResult {
        let target = self.resolve_type(ty)?;
        let argv = self.eval_args(&target.to_string(), args)?;
        tracing::trace!(ty = %target, arity = argv.len(), "construct");
        Ok(self.runtime.host.construct(&target, &argv)?)
    }

    /// `target op= value`. The location is read before `value` runs.
    pub(super) fn eval_assign(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> EvalResult {
        let location = self.to_left_value(target)?;
        let Some(bin) = op.binary_op() else {
            let rhs = self.eval_expr(value)?;
            return self.assign_left_value(&location, rhs);
        };
        let old = self.read_left_value(&location)?;
        let rhs = self.eval_expr(value)?;
        if rhs.is_void() {
            return Err(EvalErrorKind::VoidAssignment.into());
        }
        let combined = self.compound(op, bin, &location, &old, &rhs)?;
        self.assign_left_value(&location, combined)
    }

    fn compound(
        &mut self,
        op: AssignOp,
        bin: BinaryOp,
        location: &LeftValue,
        old: &Value,
        rhs: &Value,
    ) -> EvalResult {
        if old.as_str().is_some() {
            if bin != BinaryOp::Add {
                return Err(EvalErrorKind::StringCompound {
                    op: op.as_symbol(),
                }
                .into());
            }
            return binary_values(bin, old, rhs);
        }
        match old {
            Value::Void => return Err(void_operand(op.as_symbol())),
            Value::Null if rhs.as_str().is_none() => return Err(null_operand(op.as_symbol())),
            Value::Foreign(_) | Value::Callable(_) | Value::Type(_) if old.unboxed().is_none() => {
                return Err(EvalErrorKind::NonPrimitiveCompound {
                    op: op.as_symbol(),
                }
                .into())
            }
            _ => {}
        }
        let result = binary_values(bin, old, rhs)?;
        let declared = location.declared_primitive(&self.lvalue_env())?;
        match (declared, result.as_primitive()) {
            // `byte b; b += 1` stays a byte.
            (Some(kind), Some(p)) if p.kind() != kind => p
                .convert(kind)
                .map(Value::Primitive)
                .ok_or_else(|| {
                    type_mismatch(
                        "compound assignment",
                        &TypeRef::primitive(kind).to_string(),
                        &result.type_name(),
                    )
                }),
            _ => Ok(result),
        }
    }
}
