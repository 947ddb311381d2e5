//! Foreign object references and the host objects the engine provides itself.

use super::{Primitive, TypeRef, Value};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// An object owned by the host.
///
/// The engine never copies host objects; it holds them through
/// [`ForeignRef`] and asks the host (or the object itself) about them.
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    /// Runtime type of the object.
    fn type_ref(&self) -> TypeRef;

    fn as_any(&self) -> &dyn Any;

    /// Text used by string concatenation.
    fn display(&self) -> String {
        format!("{}@object", self.type_ref())
    }

    /// Primitive held by a boxed wrapper object.
    fn unbox(&self) -> Option<Primitive> {
        None
    }

    /// Snapshot of the elements for enhanced-for, if the object is iterable.
    fn iter_values(&self) -> Option<Vec<Value>> {
        None
    }

    /// Content equality (`equals`). Defaults to identity.
    fn content_eq(&self, other: &dyn HostObject) -> bool {
        std::ptr::addr_eq(self as *const Self, other as *const dyn HostObject)
    }
}

fn object_addr(object: &dyn HostObject) -> usize {
    std::ptr::from_ref(object).cast::<()>() as usize
}

thread_local! {
    /// Containers whose text is being built on this thread.
    static RENDERING: RefCell<FxHashSet<usize>> = RefCell::new(FxHashSet::default());
}

struct Rendering(usize);

impl Drop for Rendering {
    fn drop(&mut self) {
        RENDERING.with(|active| active.borrow_mut().remove(&self.0));
    }
}

/// Build the text of a container that may hold itself.
///
/// A container reached again while its own text is still being built
/// renders as `placeholder`.
pub fn render_container(
    object: &dyn HostObject,
    placeholder: &str,
    render: impl FnOnce() -> String,
) -> String {
    let addr = object_addr(object);
    if !RENDERING.with(|active| active.borrow_mut().insert(addr)) {
        return placeholder.to_owned();
    }
    let _active = Rendering(addr);
    crate::stack::ensure_sufficient_stack(render)
}

/// Shared handle to a host object. Cloning shares the object.
#[derive(Clone)]
pub struct ForeignRef(Arc<dyn HostObject>);

impl ForeignRef {
    pub fn new<T: HostObject>(object: T) -> Self {
        ForeignRef(Arc::new(object))
    }

    pub fn object(&self) -> &dyn HostObject {
        &*self.0
    }

    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &ForeignRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address used as an identity key while this reference is alive.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn type_ref(&self) -> TypeRef {
        self.0.type_ref()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.downcast_ref::<StrObject>().map(StrObject::as_str)
    }

    pub fn as_array(&self) -> Option<&ArrayObject> {
        self.downcast_ref::<ArrayObject>()
    }
}

impl fmt::Debug for ForeignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignRef({:?})", self.0)
    }
}

/// Immutable text.
#[derive(Debug)]
pub struct StrObject {
    text: Box<str>,
}

impl StrObject {
    pub fn new(text: &str) -> Self {
        StrObject { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl HostObject for StrObject {
    fn type_ref(&self) -> TypeRef {
        TypeRef::string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        self.text.to_string()
    }

    fn iter_values(&self) -> Option<Vec<Value>> {
        Some(
            self.text
                .encode_utf16()
                .map(|unit| Value::Primitive(Primitive::Char(unit)))
                .collect(),
        )
    }

    fn content_eq(&self, other: &dyn HostObject) -> bool {
        other
            .as_any()
            .downcast_ref::<StrObject>()
            .is_some_and(|o| o.text == self.text)
    }
}

/// Fixed-length array with a declared component type.
#[derive(Debug)]
pub struct ArrayObject {
    component: TypeRef,
    items: RwLock<Vec<Value>>,
}

impl ArrayObject {
    /// Array of `len` default values of `component`.
    pub fn filled(component: TypeRef, len: usize) -> Self {
        let items = vec![component.default_value(); len];
        ArrayObject {
            component,
            items: RwLock::new(items),
        }
    }

    /// Array holding `items`, which must already conform to `component`.
    pub fn from_values(component: TypeRef, items: Vec<Value>) -> Self {
        ArrayObject {
            component,
            items: RwLock::new(items),
        }
    }

    pub fn component(&self) -> &TypeRef {
        &self.component
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Store without type checking; returns false when out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    /// Number of array dimensions of this object's type.
    pub fn dimensions(&self) -> u8 {
        self.component.dims.saturating_add(1)
    }

    /// Per-dimension lengths, following the first element of each level.
    /// At most one entry per dimension of the array's type.
    pub fn shape(&self) -> Vec<usize> {
        let dims = usize::from(self.dimensions());
        let mut shape = vec![self.len()];
        let mut next = self.get(0);
        while shape.len() < dims {
            let Some(array) = next.as_ref().and_then(Value::as_array) else {
                break;
            };
            shape.push(array.len());
            next = array.get(0);
        }
        shape
    }
}

impl HostObject for ArrayObject {
    fn type_ref(&self) -> TypeRef {
        self.component.array_of()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Identity form, as the host prints arrays: `[I@7f3a10`.
    fn display(&self) -> String {
        format!("{}@{:x}", self.type_ref().binary_name(), object_addr(self))
    }

    fn iter_values(&self) -> Option<Vec<Value>> {
        Some(self.to_vec())
    }
}

/// Exception object raised by the engine itself (division by zero,
/// index out of range) or by hosts without their own exception model.
#[derive(Debug)]
pub struct ThrowableObject {
    class: TypeRef,
    message: Option<String>,
}

impl ThrowableObject {
    pub fn new(class: &str, message: Option<&str>) -> Self {
        ThrowableObject {
            class: TypeRef::class(class),
            message: message.map(str::to_owned),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl HostObject for ThrowableObject {
    fn type_ref(&self) -> TypeRef {
        self.class.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {message}", self.class),
            None => self.class.to_string(),
        }
    }
}
