//! Monitors for `synchronized` blocks.
//!
//! Blocks synchronized on identical values run one at a time. A thread may
//! re-enter a monitor it already holds. An entry lives only while some
//! thread holds or waits for it.

use crate::errors::{EvalError, EvalErrorKind};
use crate::value::{ForeignRef, TypeRef, Value};
use parking_lot::{Mutex, ReentrantMutex};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use zoola_ir::PrimitiveKind;

/// Identity of a monitor value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum MonitorKey {
    Object(usize),
    Type(TypeRef),
    Primitive(PrimitiveKind, u64),
}

struct MonitorEntry {
    lock: Arc<ReentrantMutex<()>>,
    /// Threads holding or waiting for `lock`, counting re-entries.
    holders: usize,
    /// Keeps the object alive so its address is not reused while keyed.
    _owner: Option<ForeignRef>,
}

/// Drops one hold on `key`, removing the entry with the last one.
struct Release<'a> {
    registry: &'a MonitorRegistry,
    key: MonitorKey,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut entries = self.registry.entries.lock();
        if let Entry::Occupied(mut entry) = entries.entry(self.key.clone()) {
            entry.get_mut().holders -= 1;
            if entry.get().holders == 0 {
                entry.remove();
                tracing::trace!("monitor entry removed");
            }
        }
    }
}

/// Process-wide table of monitors, shared by every context of a runtime.
#[derive(Default)]
pub struct MonitorRegistry {
    entries: Mutex<FxHashMap<MonitorKey, MonitorEntry>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the monitor of `monitor`.
    pub fn synchronized<R>(&self, monitor: &Value, f: impl FnOnce() -> R) -> Result<R, EvalError> {
        let (key, owner) = match monitor {
            Value::Foreign(obj) => (MonitorKey::Object(obj.addr()), Some(obj.clone())),
            Value::Type(ty) => (MonitorKey::Type(ty.clone()), None),
            Value::Primitive(p) => {
                let (kind, bits) = p.identity_bits();
                (MonitorKey::Primitive(kind, bits), None)
            }
            other => {
                return Err(EvalErrorKind::InvalidMonitor {
                    found: other.type_name(),
                }
                .into())
            }
        };
        let lock = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_insert_with(|| MonitorEntry {
                lock: Arc::new(ReentrantMutex::new(())),
                holders: 0,
                _owner: owner,
            });
            entry.holders += 1;
            Arc::clone(&entry.lock)
        };
        let _release = Release {
            registry: self,
            key,
        };
        let _held = lock.lock();
        tracing::debug!("monitor acquired");
        Ok(f())
    }

    /// Number of monitors currently held or waited for.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("len", &self.len())
            .finish()
    }
}
