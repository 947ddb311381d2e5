//! Assignable locations.
//!
//! A [`LeftValue`] is resolved once from the target of an assignment or an
//! update operator, then read and written through the same handle, so a
//! compound assignment reads the location before the right-hand side runs
//! and writes it afterwards.

use crate::coercion::{convert, Conversion};
use crate::errors::{strict, EvalError, EvalErrorKind, EvalResult};
use crate::host::HostResolver;
use crate::scope::{ScopeArena, ScopeId};
use crate::value::{names, ForeignRef, TypeRef, Value};
use zoola_ir::{Name, PrimitiveKind, StringInterner};

/// An assignable location.
#[derive(Clone, Debug)]
pub enum LeftValue {
    /// A variable as seen from `scope`. The owning scope is found on access;
    /// an unbound name is declared in `scope` on first write.
    Variable { scope: ScopeId, name: Name },
    /// An element of an engine array.
    ArrayElement { array: ForeignRef, index: i32 },
    /// A field of a host object, or a static field of a type value.
    Field { target: Value, name: String },
    /// `target{key}`.
    Property { target: Value, key: String },
}

/// What a left value needs to be read or written.
pub struct LvalueEnv<'a> {
    pub scopes: &'a mut ScopeArena,
    pub host: &'a dyn HostResolver,
    pub interner: &'a StringInterner,
}

impl LeftValue {
    /// Current value of the location. An unbound variable reads as `void`.
    pub fn get(&self, env: &LvalueEnv<'_>) -> EvalResult {
        match self {
            LeftValue::Variable { scope, name } => Ok(env
                .scopes
                .lookup(*scope, *name)?
                .map_or(Value::Void, |slot| slot.value.clone())),
            LeftValue::ArrayElement { array, index } => {
                let items = array_of(array)?;
                usize::try_from(*index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or_else(|| out_of_bounds(env.host, *index, items.len()))
            }
            LeftValue::Field { target, name } => Ok(env.host.get_field(target, name)?),
            LeftValue::Property { target, key } => Ok(env.host.get_property(target, key)?),
        }
    }

    /// Store `value`, converting it to the location's declared type.
    /// Returns the value actually stored.
    pub fn assign(&self, env: &mut LvalueEnv<'_>, value: Value, strict_java: bool) -> EvalResult {
        if value.is_void() {
            return Err(EvalErrorKind::VoidAssignment.into());
        }
        match self {
            LeftValue::Variable { scope, name } => {
                assign_variable(env, *scope, *name, value, strict_java)
            }
            LeftValue::ArrayElement { array, index } => {
                let items = array_of(array)?;
                let stored = convert(
                    env.host,
                    &value,
                    items.component(),
                    Conversion::Assignment,
                    "array element assignment",
                )?;
                let in_range = usize::try_from(*index)
                    .ok()
                    .is_some_and(|i| items.set(i, stored.clone()));
                if in_range {
                    Ok(stored)
                } else {
                    Err(out_of_bounds(env.host, *index, items.len()))
                }
            }
            LeftValue::Field { target, name } => {
                env.host.set_field(target, name, value.clone())?;
                Ok(value)
            }
            LeftValue::Property { target, key } => {
                env.host.set_property(target, key, value.clone())?;
                Ok(value)
            }
        }
    }

    /// Primitive kind the location is declared with, if any. Compound
    /// assignment narrows its result back to this kind.
    pub fn declared_primitive(&self, env: &LvalueEnv<'_>) -> Result<Option<PrimitiveKind>, EvalError> {
        match self {
            LeftValue::Variable { scope, name } => Ok(env
                .scopes
                .lookup(*scope, *name)?
                .and_then(|slot| slot.declared_type())
                .and_then(TypeRef::as_primitive)),
            LeftValue::ArrayElement { array, .. } => {
                Ok(array_of(array)?.component().as_primitive())
            }
            LeftValue::Field { .. } | LeftValue::Property { .. } => Ok(None),
        }
    }

    /// Text naming the location in fault messages.
    pub fn describe(&self, interner: &StringInterner) -> String {
        match self {
            LeftValue::Variable { name, .. } => interner.lookup(*name).to_owned(),
            LeftValue::ArrayElement { index, .. } => format!("array element [{index}]"),
            LeftValue::Field { name, .. } => format!("field {name}"),
            LeftValue::Property { key, .. } => format!("property {{{key}}}"),
        }
    }
}

fn assign_variable(
    env: &mut LvalueEnv<'_>,
    scope: ScopeId,
    name: Name,
    value: Value,
    strict_java: bool,
) -> EvalResult {
    let display = env.interner.lookup(name);
    let Some(owner) = env.scopes.owner_of(scope, name)? else {
        if strict_java {
            return Err(strict(format!("assignment to undeclared variable: {display}")));
        }
        env.scopes.define_untyped(scope, name, value.clone())?;
        return Ok(value);
    };
    let declared = match env.scopes.local(owner, name)? {
        Some(slot) => {
            // A final slot declared without an initializer takes one assignment.
            if slot.is_final() && !slot.value.is_void() {
                return Err(EvalErrorKind::FinalAssignment {
                    name: display.to_owned(),
                }
                .into());
            }
            slot.declared_type().cloned()
        }
        None => None,
    };
    let stored = match declared {
        Some(ty) => convert(
            env.host,
            &value,
            &ty,
            Conversion::Assignment,
            &format!("assignment to '{display}'"),
        )?,
        None => value,
    };
    if let Some(slot) = env.scopes.local_mut(owner, name)? {
        slot.value = stored.clone();
    }
    Ok(stored)
}

fn array_of(array: &ForeignRef) -> Result<&crate::value::ArrayObject, EvalError> {
    array.as_array().ok_or_else(|| {
        EvalErrorKind::NotAnArray {
            found: array.type_ref().to_string(),
        }
        .into()
    })
}

/// Target fault for an index outside `0..len`.
#[cold]
pub(crate) fn out_of_bounds(host: &dyn HostResolver, index: i32, len: usize) -> EvalError {
    let exception = host.new_exception(
        names::INDEX_OUT_OF_BOUNDS,
        &format!("Index {index} out of bounds for length {len}"),
    );
    EvalErrorKind::Thrown(exception).into()
}
