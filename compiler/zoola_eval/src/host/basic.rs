//! Reference host: a small Java-like class library.
//!
//! Covers what scripts and tests commonly touch: a `java.lang` type
//! hierarchy with boxed wrappers and exceptions, `ArrayList`/`HashMap`
//! style collections, string methods, plain records for generated classes,
//! and a `print` command whose output is captured.

use super::{ClassGenerator, ClassSpec, HostResolver};
use crate::errors::HostError;
use crate::value::{
    names, render_container, Callable, ClassRef, ForeignRef, HostMethod, HostObject, Primitive,
    StrObject, ThrowableObject, TypeRef, Value,
};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct ClassInfo {
    superclass: Option<String>,
    interfaces: Vec<String>,
    is_interface: bool,
    /// Instances are field records (generated classes and `Object`).
    record: bool,
}

/// Boxed wrapper object (`Integer`, `Boolean`, ...).
#[derive(Debug)]
pub struct Boxed(pub Primitive);

impl HostObject for Boxed {
    fn type_ref(&self) -> TypeRef {
        TypeRef::class(self.0.kind().wrapper_name())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        self.0.to_string()
    }

    fn unbox(&self) -> Option<Primitive> {
        Some(self.0)
    }
}

/// Growable list (`java.util.ArrayList`).
#[derive(Debug, Default)]
pub struct ListObject {
    items: RwLock<Vec<Value>>,
}

impl ListObject {
    pub fn from_values(items: Vec<Value>) -> Self {
        ListObject {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }
}

impl HostObject for ListObject {
    fn type_ref(&self) -> TypeRef {
        TypeRef::class("java.util.ArrayList")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        render_container(self, "(this Collection)", || {
            let items: Vec<String> = self.items.read().iter().map(ToString::to_string).collect();
            format!("[{}]", items.join(", "))
        })
    }

    fn iter_values(&self) -> Option<Vec<Value>> {
        Some(self.items.read().clone())
    }
}

/// Insertion-ordered map (`java.util.HashMap`). Keys compare by content.
#[derive(Debug, Default)]
pub struct MapObject {
    entries: RwLock<Vec<(Value, Value)>>,
}

impl MapObject {
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Insert or replace, returning the previous value.
    pub fn put(&self, key: Value, value: Value) -> Option<Value> {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut entry.1, value));
        }
        entries.push((key, value));
        None
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl HostObject for MapObject {
    fn type_ref(&self) -> TypeRef {
        TypeRef::class("java.util.HashMap")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        render_container(self, "(this Map)", || {
            let entries: Vec<String> = self
                .entries
                .read()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            format!("{{{}}}", entries.join(", "))
        })
    }

    /// Iterates the keys.
    fn iter_values(&self) -> Option<Vec<Value>> {
        Some(self.entries.read().iter().map(|(k, _)| k.clone()).collect())
    }
}

/// Instance of a record class: a bag of named fields.
#[derive(Debug)]
pub struct RecordObject {
    class: TypeRef,
    fields: RwLock<FxHashMap<String, Value>>,
}

impl HostObject for RecordObject {
    fn type_ref(&self) -> TypeRef {
        self.class.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A method of the built-in library, resolved by name.
#[derive(Debug)]
struct Builtin {
    name: String,
}

impl HostMethod for Builtin {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, HostError> {
        call_builtin(receiver, &self.name, args)?
            .ok_or_else(|| HostError::NotFound(format!("method {}", self.name)))
    }
}

/// The reference host.
#[derive(Debug)]
pub struct BasicHost {
    classes: RwLock<FxHashMap<String, ClassInfo>>,
    output: Mutex<Vec<String>>,
    generated: AtomicUsize,
}

impl BasicHost {
    pub fn new() -> Self {
        let host = BasicHost {
            classes: RwLock::new(FxHashMap::default()),
            output: Mutex::new(Vec::new()),
            generated: AtomicUsize::new(0),
        };
        let object = Some(names::OBJECT);
        host.register(names::OBJECT, None, &[], false);
        host.register(
            names::STRING,
            object,
            &["java.lang.CharSequence", "java.lang.Comparable"],
            false,
        );
        for iface in [
            "java.lang.CharSequence",
            "java.lang.Comparable",
            "java.lang.Runnable",
            "java.lang.Iterable",
            "java.util.Map",
        ] {
            host.register(iface, None, &[], true);
        }
        host.register("java.util.Collection", None, &["java.lang.Iterable"], true);
        host.register("java.util.List", None, &["java.util.Collection"], true);
        host.register("java.util.ArrayList", object, &["java.util.List"], false);
        host.register("java.util.HashMap", object, &["java.util.Map"], false);
        host.register(names::CLASS, object, &[], false);
        host.register(names::SCRIPT_METHOD, object, &[], false);
        host.register("java.lang.Number", object, &[], false);
        for kind in zoola_ir::PrimitiveKind::ALL {
            let parent = if kind.is_numeric() && kind != zoola_ir::PrimitiveKind::Char {
                "java.lang.Number"
            } else {
                names::OBJECT
            };
            host.register(kind.wrapper_name(), Some(parent), &["java.lang.Comparable"], false);
        }
        host.register(names::THROWABLE, object, &[], false);
        host.register(names::EXCEPTION, Some(names::THROWABLE), &[], false);
        host.register("java.lang.Error", Some(names::THROWABLE), &[], false);
        host.register(names::RUNTIME_EXCEPTION, Some(names::EXCEPTION), &[], false);
        for runtime in [
            names::ARITHMETIC_EXCEPTION,
            names::NEGATIVE_ARRAY_SIZE,
            "java.lang.IllegalStateException",
            "java.lang.IllegalArgumentException",
            "java.lang.NullPointerException",
            "java.lang.IndexOutOfBoundsException",
        ] {
            host.register(runtime, Some(names::RUNTIME_EXCEPTION), &[], false);
        }
        host.register(
            names::INDEX_OUT_OF_BOUNDS,
            Some("java.lang.IndexOutOfBoundsException"),
            &[],
            false,
        );
        host.register("java.io.IOException", Some(names::EXCEPTION), &[], false);
        if let Some(info) = host.classes.write().get_mut(names::OBJECT) {
            info.record = true;
        }
        host
    }

    fn register(&self, name: &str, superclass: Option<&str>, interfaces: &[&str], is_interface: bool) {
        self.classes.write().insert(
            name.to_owned(),
            ClassInfo {
                superclass: superclass.map(str::to_owned),
                interfaces: interfaces.iter().map(|s| (*s).to_owned()).collect(),
                is_interface,
                record: false,
            },
        );
    }

    /// Lines printed through the `print`/`println` commands.
    pub fn output(&self) -> Vec<String> {
        self.output.lock().clone()
    }

    /// How many classes the generator has synthesized.
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    fn knows(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    fn is_subclass(&self, target: &str, source: &str) -> bool {
        if target == source || target == names::OBJECT {
            return true;
        }
        let classes = self.classes.read();
        let mut pending = vec![source.to_owned()];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if let Some(info) = classes.get(&current) {
                pending.extend(info.superclass.iter().cloned());
                pending.extend(info.interfaces.iter().cloned());
            }
        }
        false
    }

    fn is_record_class(&self, name: &str) -> bool {
        self.classes.read().get(name).is_some_and(|c| c.record)
    }
}

impl Default for BasicHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostResolver for BasicHost {
    fn resolve_type(&self, name: &str) -> Result<TypeRef, HostError> {
        if name == "Primitive" || name == names::PRIMITIVE_MARKER {
            return Ok(TypeRef::marker());
        }
        if self.knows(name) {
            return Ok(TypeRef::class(name));
        }
        ["java.lang.", "java.util.", "java.io."]
            .iter()
            .map(|pkg| format!("{pkg}{name}"))
            .find(|qualified| self.knows(qualified))
            .map(|qualified| TypeRef::class(&qualified))
            .ok_or_else(|| HostError::NotFound(format!("class {name}")))
    }

    fn is_assignable(&self, target: &ClassRef, source: &ClassRef) -> bool {
        self.is_subclass(target.name(), source.name())
    }

    fn is_interface(&self, class: &ClassRef) -> bool {
        self.classes
            .read()
            .get(class.name())
            .is_some_and(|c| c.is_interface)
    }

    fn get_field(&self, target: &Value, name: &str) -> Result<Value, HostError> {
        match target {
            Value::Type(ty) => static_field(ty, name),
            Value::Foreign(obj) => match obj.downcast_ref::<RecordObject>() {
                Some(record) => record
                    .fields
                    .read()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| HostError::NotFound(format!("field {name}"))),
                None => Err(HostError::NotFound(format!("field {name} of {}", obj.type_ref()))),
            },
            other => Err(HostError::NotFound(format!("field {name} of {}", other.type_name()))),
        }
    }

    fn set_field(&self, target: &Value, name: &str, value: Value) -> Result<(), HostError> {
        match target.as_foreign().and_then(|o| o.downcast_ref::<RecordObject>()) {
            Some(record) => {
                record.fields.write().insert(name.to_owned(), value);
                Ok(())
            }
            None => Err(HostError::Inaccessible(format!(
                "field {name} of {}",
                target.type_name()
            ))),
        }
    }

    fn get_property(&self, target: &Value, key: &str) -> Result<Value, HostError> {
        match target.as_foreign().and_then(|o| o.downcast_ref::<MapObject>()) {
            Some(map) => Ok(map.get(&Value::string(key)).unwrap_or(Value::Null)),
            None => self.get_field(target, key),
        }
    }

    fn set_property(&self, target: &Value, key: &str, value: Value) -> Result<(), HostError> {
        match target.as_foreign().and_then(|o| o.downcast_ref::<MapObject>()) {
            Some(map) => {
                map.put(Value::string(key), value);
                Ok(())
            }
            None => self.set_field(target, key, value),
        }
    }

    fn resolve_method(&self, receiver: &Value, name: &str, args: &[Value]) -> Result<Callable, HostError> {
        if !builtin_exists(receiver, name, args.len()) {
            return Err(HostError::NotFound(format!(
                "method {name}/{} on {}",
                args.len(),
                receiver.type_name()
            )));
        }
        Ok(Callable::host(
            receiver.clone(),
            Arc::new(Builtin {
                name: name.to_owned(),
            }),
        ))
    }

    fn invoke_function(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        match name {
            "print" | "println" => {
                let line: Vec<String> = args.iter().map(ToString::to_string).collect();
                self.output.lock().push(line.join(" "));
                Ok(Value::Void)
            }
            _ => Err(HostError::NotFound(format!("command {name}"))),
        }
    }

    fn construct(&self, ty: &TypeRef, args: &[Value]) -> Result<Value, HostError> {
        let Some(class) = ty.as_class() else {
            return Err(HostError::Failed(format!("cannot instantiate {ty}")));
        };
        let name = class.name();
        let object = match name {
            "java.util.ArrayList" => ForeignRef::new(ListObject::default()),
            "java.util.HashMap" => ForeignRef::new(MapObject::default()),
            names::STRING => ForeignRef::new(StrObject::new(
                &args.first().map(ToString::to_string).unwrap_or_default(),
            )),
            _ if self.is_subclass(names::THROWABLE, name) => {
                let message = args.first().map(ToString::to_string);
                ForeignRef::new(ThrowableObject::new(name, message.as_deref()))
            }
            _ if self.is_record_class(name) => ForeignRef::new(RecordObject {
                class: ty.clone(),
                fields: RwLock::new(FxHashMap::default()),
            }),
            _ => {
                let boxed = zoola_ir::PrimitiveKind::ALL
                    .into_iter()
                    .find(|k| k.wrapper_name() == name)
                    .zip(args.first().and_then(Value::unboxed))
                    .and_then(|(kind, p)| p.convert(kind));
                match boxed {
                    Some(p) => ForeignRef::new(Boxed(p)),
                    None => return Err(HostError::NotFound(format!("constructor of {name}"))),
                }
            }
        };
        Ok(Value::Foreign(object))
    }
}

impl ClassGenerator for BasicHost {
    fn generate(&self, spec: &ClassSpec<'_>) -> Result<TypeRef, HostError> {
        let superclass = spec
            .super_type
            .as_ref()
            .and_then(TypeRef::as_class)
            .map_or_else(|| names::OBJECT.to_owned(), |c| c.name().to_owned());
        let interfaces = spec
            .interfaces
            .iter()
            .filter_map(TypeRef::as_class)
            .map(|c| c.name().to_owned())
            .collect();
        self.classes.write().insert(
            spec.name.to_owned(),
            ClassInfo {
                superclass: Some(superclass),
                interfaces,
                is_interface: spec.is_interface,
                record: !spec.is_interface,
            },
        );
        self.generated.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(class = spec.name, "generated class");
        Ok(TypeRef::class(spec.name))
    }
}

fn static_field(ty: &TypeRef, name: &str) -> Result<Value, HostError> {
    let class = ty.as_class().map(ClassRef::name).unwrap_or_default();
    let value = match (class, name) {
        ("java.lang.Integer", "MAX_VALUE") => Value::int(i32::MAX),
        ("java.lang.Integer", "MIN_VALUE") => Value::int(i32::MIN),
        ("java.lang.Long", "MAX_VALUE") => Value::long(i64::MAX),
        ("java.lang.Long", "MIN_VALUE") => Value::long(i64::MIN),
        ("java.lang.Boolean", "TRUE") => Value::foreign(Boxed(Primitive::Bool(true))),
        ("java.lang.Boolean", "FALSE") => Value::foreign(Boxed(Primitive::Bool(false))),
        _ => return Err(HostError::NotFound(format!("static field {class}.{name}"))),
    };
    Ok(value)
}

fn builtin_exists(receiver: &Value, name: &str, arity: usize) -> bool {
    let universal = matches!((name, arity), ("toString" | "hashCode", 0) | ("equals", 1));
    let Value::Foreign(obj) = receiver else {
        return matches!(receiver, Value::Type(_)) && universal;
    };
    if universal {
        return true;
    }
    if obj.as_str().is_some() {
        return matches!(
            (name, arity),
            ("length" | "isEmpty" | "toUpperCase" | "toLowerCase" | "trim", 0)
                | ("charAt" | "indexOf" | "startsWith" | "concat" | "substring", 1)
                | ("substring", 2)
        );
    }
    if obj.downcast_ref::<ListObject>().is_some() {
        return matches!((name, arity), ("size" | "isEmpty", 0) | ("add" | "get" | "contains", 1));
    }
    if obj.downcast_ref::<MapObject>().is_some() {
        return matches!((name, arity), ("size" | "isEmpty", 0) | ("get" | "containsKey", 1) | ("put", 2));
    }
    if obj.downcast_ref::<ThrowableObject>().is_some() {
        return matches!((name, arity), ("getMessage", 0));
    }
    if obj.downcast_ref::<Boxed>().is_some() {
        return matches!((name, arity), ("intValue" | "longValue" | "doubleValue" | "booleanValue", 0));
    }
    false
}

fn int_arg(args: &[Value], index: usize) -> Result<i32, HostError> {
    args.get(index)
        .and_then(Value::unboxed)
        .and_then(Primitive::as_int)
        .ok_or_else(|| HostError::Failed(format!("argument {index} must be an int")))
}

fn str_arg(args: &[Value], index: usize) -> Result<String, HostError> {
    args.get(index)
        .map(ToString::to_string)
        .ok_or_else(|| HostError::Failed(format!("missing argument {index}")))
}

fn out_of_bounds(index: i32, len: usize) -> HostError {
    HostError::Thrown(Value::foreign(ThrowableObject::new(
        "java.lang.IndexOutOfBoundsException",
        Some(&format!("Index {index} out of bounds for length {len}")),
    )))
}

fn usize_of(len: usize) -> Value {
    Value::int(i32::try_from(len).unwrap_or(i32::MAX))
}

/// Dispatch a library method; `Ok(None)` when the receiver has no such method.
fn call_builtin(receiver: &Value, name: &str, args: &[Value]) -> Result<Option<Value>, HostError> {
    match (name, args) {
        ("toString", []) => return Ok(Some(Value::string(&receiver.to_string()))),
        ("equals", [other]) => return Ok(Some(Value::bool(receiver == other))),
        ("hashCode", []) => {
            let hash = receiver
                .to_string()
                .encode_utf16()
                .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
            return Ok(Some(Value::int(hash)));
        }
        _ => {}
    }
    let Some(obj) = receiver.as_foreign() else {
        return Ok(None);
    };
    if let Some(text) = obj.as_str() {
        let units: Vec<u16> = text.encode_utf16().collect();
        let result = match name {
            "length" => usize_of(units.len()),
            "isEmpty" => Value::bool(units.is_empty()),
            "toUpperCase" => Value::string(&text.to_uppercase()),
            "toLowerCase" => Value::string(&text.to_lowercase()),
            "trim" => Value::string(text.trim()),
            "charAt" => {
                let index = int_arg(args, 0)?;
                let unit = usize::try_from(index)
                    .ok()
                    .and_then(|i| units.get(i).copied())
                    .ok_or_else(|| out_of_bounds(index, units.len()))?;
                Value::Primitive(Primitive::Char(unit))
            }
            "indexOf" => {
                let needle = str_arg(args, 0)?;
                let found = text.find(&needle).map_or(-1, |byte| {
                    i32::try_from(text[..byte].encode_utf16().count()).unwrap_or(-1)
                });
                Value::int(found)
            }
            "startsWith" => Value::bool(text.starts_with(&str_arg(args, 0)?)),
            "concat" => Value::string(&format!("{text}{}", str_arg(args, 0)?)),
            "substring" => {
                let begin = int_arg(args, 0)?;
                let end = if args.len() > 1 {
                    int_arg(args, 1)?
                } else {
                    i32::try_from(units.len()).unwrap_or(i32::MAX)
                };
                let range = usize::try_from(begin)
                    .ok()
                    .zip(usize::try_from(end).ok())
                    .filter(|(b, e)| b <= e && *e <= units.len());
                let Some((b, e)) = range else {
                    return Err(out_of_bounds(end, units.len()));
                };
                Value::string(&String::from_utf16_lossy(&units[b..e]))
            }
            _ => return Ok(None),
        };
        return Ok(Some(result));
    }
    if let Some(list) = obj.downcast_ref::<ListObject>() {
        let result = match name {
            "size" => usize_of(list.len()),
            "isEmpty" => Value::bool(list.is_empty()),
            "add" => {
                list.push(args.first().cloned().unwrap_or(Value::Null));
                Value::bool(true)
            }
            "contains" => Value::bool(
                args.first()
                    .is_some_and(|needle| list.items.read().iter().any(|v| v == needle)),
            ),
            "get" => {
                let index = int_arg(args, 0)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.get(i))
                    .ok_or_else(|| out_of_bounds(index, list.len()))?
            }
            _ => return Ok(None),
        };
        return Ok(Some(result));
    }
    if let Some(map) = obj.downcast_ref::<MapObject>() {
        let key = args.first().cloned().unwrap_or(Value::Null);
        let result = match name {
            "size" => usize_of(map.len()),
            "isEmpty" => Value::bool(map.is_empty()),
            "get" => map.get(&key).unwrap_or(Value::Null),
            "containsKey" => Value::bool(map.get(&key).is_some()),
            "put" => map
                .put(key, args.get(1).cloned().unwrap_or(Value::Null))
                .unwrap_or(Value::Null),
            _ => return Ok(None),
        };
        return Ok(Some(result));
    }
    if let Some(throwable) = obj.downcast_ref::<ThrowableObject>() {
        if name == "getMessage" {
            return Ok(Some(throwable.message().map_or(Value::Null, Value::string)));
        }
        return Ok(None);
    }
    if let Some(Boxed(p)) = obj.downcast_ref::<Boxed>() {
        let target = match name {
            "intValue" => zoola_ir::PrimitiveKind::Int,
            "longValue" => zoola_ir::PrimitiveKind::Long,
            "doubleValue" => zoola_ir::PrimitiveKind::Double,
            "booleanValue" => zoola_ir::PrimitiveKind::Bool,
            _ => return Ok(None),
        };
        return Ok(p.convert(target).map(Value::Primitive));
    }
    Ok(None)
}
