//! State shared between evaluation contexts.
//!
//! Each [`Interpreter`](crate::Interpreter) owns its scopes and call stack.
//! Everything here may be shared by several interpreters, including ones
//! running on other threads: the interner, the host collaborators, the
//! monitor registry, the class cache and the string-literal pool.

use crate::class_cache::ClassCache;
use crate::host::{BasicHost, ClassGenerator, DefaultIterables, HostResolver, IterableAdapter};
use crate::monitor::MonitorRegistry;
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use zoola_ir::{Name, SharedInterner};

/// Interned string literals: equal literals evaluate to one object.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: RwLock<FxHashMap<Name, Value>>,
}

impl StringPool {
    pub fn literal(&self, name: Name, interner: &SharedInterner) -> Value {
        if let Some(value) = self.strings.read().get(&name) {
            return value.clone();
        }
        self.strings
            .write()
            .entry(name)
            .or_insert_with(|| Value::string(interner.lookup(name)))
            .clone()
    }
}

/// Cheaply cloneable handle to the shared runtime.
#[derive(Clone)]
pub struct SharedRuntime {
    pub interner: SharedInterner,
    pub host: Arc<dyn HostResolver>,
    pub iterables: Arc<dyn IterableAdapter>,
    pub classes: Arc<dyn ClassGenerator>,
    pub monitors: Arc<MonitorRegistry>,
    pub class_cache: Arc<ClassCache>,
    pub strings: Arc<StringPool>,
}

impl SharedRuntime {
    /// Runtime backed by a [`BasicHost`] that also generates classes.
    pub fn with_basic_host(interner: SharedInterner) -> Self {
        let host = Arc::new(BasicHost::new());
        Self::new(interner, host.clone(), host)
    }

    pub fn new(
        interner: SharedInterner,
        host: Arc<dyn HostResolver>,
        classes: Arc<dyn ClassGenerator>,
    ) -> Self {
        SharedRuntime {
            interner,
            host,
            iterables: Arc::new(DefaultIterables),
            classes,
            monitors: Arc::new(MonitorRegistry::new()),
            class_cache: Arc::new(ClassCache::new()),
            strings: Arc::new(StringPool::default()),
        }
    }
}

impl fmt::Debug for SharedRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRuntime")
            .field("interner", &self.interner)
            .field("monitors", &self.monitors)
            .field("class_cache", &self.class_cache)
            .finish_non_exhaustive()
    }
}
