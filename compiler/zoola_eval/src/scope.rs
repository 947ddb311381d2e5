//! Scope arena: the variable-scope chain.
//!
//! Scopes are records in a generational arena addressed by [`ScopeId`].
//! Each record holds an optional parent handle used for read resolution.
//! The call stack stores handles too, so no scope is owned twice.
//!
//! Block scopes are released when their block exits and their slot is
//! recycled with a bumped generation. A scope whose method is still held
//! outside its table (or that is the parent of such a scope) is retained
//! past its block and freed by a later [`ScopeArena::sweep`]. Using a
//! released handle is an internal fault, never a silent read of someone
//! else's variables.

use crate::errors::{internal, EvalError, EvalErrorKind};
use crate::value::{ScriptMethod, TypeRef, Value};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use zoola_ir::{Modifiers, Name};

/// Handle to a scope record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// Lifetime class of a scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    /// The root of an evaluation context.
    Global,
    /// One invocation of a scripted method.
    Method,
    /// Statement body, loop header, catch clause.
    Block,
}

/// Declaration attached to a slot.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotType {
    Untyped,
    Typed { ty: TypeRef, modifiers: Modifiers },
}

/// A variable binding.
#[derive(Clone, Debug)]
pub struct Slot {
    pub value: Value,
    pub decl: SlotType,
}

impl Slot {
    pub fn declared_type(&self) -> Option<&TypeRef> {
        match &self.decl {
            SlotType::Typed { ty, .. } => Some(ty),
            SlotType::Untyped => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(&self.decl, SlotType::Typed { modifiers, .. } if modifiers.contains(Modifiers::FINAL))
    }
}

#[derive(Debug)]
struct ScopeRecord {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    vars: FxHashMap<Name, Slot>,
    methods: FxHashMap<Name, Arc<ScriptMethod>>,
    /// Its block or call has ended; the record lives on for captures.
    exited: bool,
    /// Exited child scopes that are still retained.
    dependents: u32,
}

impl ScopeRecord {
    /// A method of this scope is referenced from outside the table.
    fn captured(&self) -> bool {
        self.methods.values().any(|m| Arc::strong_count(m) > 1)
    }

    fn retained(&self) -> bool {
        self.dependents > 0 || self.captured()
    }
}

#[derive(Debug)]
struct Entry {
    generation: u32,
    record: Option<ScopeRecord>,
}

/// Retained scopes tolerated before a release triggers a sweep.
const SWEEP_THRESHOLD: usize = 16;

/// All scopes of one evaluation context.
#[derive(Debug)]
pub struct ScopeArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    global: ScopeId,
    /// Exited scopes kept alive by captured methods.
    retained: Vec<ScopeId>,
    sweep_at: usize,
}

impl ScopeArena {
    pub fn new() -> Self {
        let mut arena = ScopeArena {
            entries: Vec::new(),
            free: Vec::new(),
            global: ScopeId {
                index: 0,
                generation: 0,
            },
            retained: Vec::new(),
            sweep_at: SWEEP_THRESHOLD,
        };
        arena.global = arena.create(ScopeKind::Global, None);
        arena
    }

    pub fn global(&self) -> ScopeId {
        self.global
    }

    /// Create a scope whose reads fall back to `parent`.
    pub fn create(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let record = ScopeRecord {
            kind,
            parent,
            vars: FxHashMap::default(),
            methods: FxHashMap::default(),
            exited: false,
            dependents: 0,
        };
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.record = Some(record);
            return ScopeId {
                index,
                generation: entry.generation,
            };
        }
        let index = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(Entry {
            generation: 0,
            record: Some(record),
        });
        ScopeId {
            index,
            generation: 0,
        }
    }

    /// End a scope's block. The record is discarded unless one of its
    /// methods is still held elsewhere, in which case it is retained until
    /// a sweep finds it unreferenced. Returns whether it was discarded.
    pub fn release(&mut self, id: ScopeId) -> bool {
        let Ok(record) = self.record_mut(id) else {
            return false;
        };
        if record.kind == ScopeKind::Global || record.exited {
            return false;
        }
        if !record.retained() {
            self.discard(id);
            return true;
        }
        record.exited = true;
        if let Some(parent) = record.parent {
            if let Ok(parent) = self.record_mut(parent) {
                parent.dependents += 1;
            }
        }
        self.retained.push(id);
        tracing::debug!(index = id.index, "scope retained by a captured method");
        if self.retained.len() >= self.sweep_at {
            self.sweep();
        }
        false
    }

    /// Free retained scopes whose methods are no longer held elsewhere.
    /// Returns the number of scopes freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        loop {
            let ready: Vec<ScopeId> = self
                .retained
                .iter()
                .copied()
                .filter(|&id| self.record(id).is_ok_and(|r| !r.retained()))
                .collect();
            if ready.is_empty() {
                break;
            }
            for id in ready {
                freed += self.discard(id);
            }
        }
        let still: Vec<ScopeId> = self
            .retained
            .iter()
            .copied()
            .filter(|&id| self.is_live(id))
            .collect();
        self.retained = still;
        self.sweep_at = (self.retained.len() * 2).max(SWEEP_THRESHOLD);
        tracing::debug!(freed, retained = self.retained.len(), "scope sweep");
        freed
    }

    /// Free a record, then any exited ancestor it alone kept alive.
    fn discard(&mut self, id: ScopeId) -> usize {
        let mut freed = 0;
        let mut next = Some(id);
        while let Some(id) = next.take() {
            let Some(entry) = self
                .entries
                .get_mut(id.index as usize)
                .filter(|e| e.generation == id.generation)
            else {
                break;
            };
            let Some(record) = entry.record.take() else {
                break;
            };
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(id.index);
            freed += 1;
            tracing::debug!(index = id.index, "scope released");
            let (true, Some(parent)) = (record.exited, record.parent) else {
                break;
            };
            if let Ok(parent_record) = self.record_mut(parent) {
                parent_record.dependents = parent_record.dependents.saturating_sub(1);
                if parent_record.exited && !parent_record.retained() {
                    next = Some(parent);
                }
            }
        }
        freed
    }

    pub fn is_live(&self, id: ScopeId) -> bool {
        self.record(id).is_ok()
    }

    /// Number of live scopes.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.record.is_some()).count()
    }

    pub fn kind(&self, id: ScopeId) -> Result<ScopeKind, EvalError> {
        Ok(self.record(id)?.kind)
    }

    pub fn parent(&self, id: ScopeId) -> Result<Option<ScopeId>, EvalError> {
        Ok(self.record(id)?.parent)
    }

    /// Nearest scope, starting at `id`, that binds `name`.
    pub fn owner_of(&self, id: ScopeId, name: Name) -> Result<Option<ScopeId>, EvalError> {
        let mut current = Some(id);
        while let Some(scope) = current {
            let record = self.record(scope)?;
            if record.vars.contains_key(&name) {
                return Ok(Some(scope));
            }
            current = record.parent;
        }
        Ok(None)
    }

    /// Read resolution along the parent chain.
    pub fn lookup(&self, id: ScopeId, name: Name) -> Result<Option<&Slot>, EvalError> {
        match self.owner_of(id, name)? {
            Some(owner) => Ok(self.record(owner)?.vars.get(&name)),
            None => Ok(None),
        }
    }

    /// Slot bound directly in `id`, ignoring parents.
    pub fn local(&self, id: ScopeId, name: Name) -> Result<Option<&Slot>, EvalError> {
        Ok(self.record(id)?.vars.get(&name))
    }

    pub fn local_mut(&mut self, id: ScopeId, name: Name) -> Result<Option<&mut Slot>, EvalError> {
        Ok(self.record_mut(id)?.vars.get_mut(&name))
    }

    /// Bind an untyped slot in `id`, replacing any binding there.
    pub fn define_untyped(&mut self, id: ScopeId, name: Name, value: Value) -> Result<(), EvalError> {
        self.record_mut(id)?.vars.insert(
            name,
            Slot {
                value,
                decl: SlotType::Untyped,
            },
        );
        Ok(())
    }

    /// Declare a typed slot in `id`. The value must already conform to `ty`.
    ///
    /// Shadows same-named slots of enclosing scopes; a second declaration
    /// in the same scope is a fault.
    pub fn declare_typed(
        &mut self,
        id: ScopeId,
        name: Name,
        ty: TypeRef,
        modifiers: Modifiers,
        value: Value,
        display_name: &str,
    ) -> Result<(), EvalError> {
        let record = self.record_mut(id)?;
        if record.vars.contains_key(&name) {
            return Err(EvalErrorKind::Redeclared {
                name: display_name.to_owned(),
            }
            .into());
        }
        record.vars.insert(
            name,
            Slot {
                value,
                decl: SlotType::Typed { ty, modifiers },
            },
        );
        Ok(())
    }

    /// Install a method, replacing any same-named method of this scope.
    pub fn declare_method(&mut self, id: ScopeId, method: Arc<ScriptMethod>) -> Result<bool, EvalError> {
        Ok(self.record_mut(id)?.methods.insert(method.name, method).is_some())
    }

    /// Method resolution along the parent chain.
    pub fn lookup_method(&self, id: ScopeId, name: Name) -> Result<Option<Arc<ScriptMethod>>, EvalError> {
        let mut current = Some(id);
        while let Some(scope) = current {
            let record = self.record(scope)?;
            if let Some(method) = record.methods.get(&name) {
                return Ok(Some(Arc::clone(method)));
            }
            current = record.parent;
        }
        Ok(None)
    }

    /// Names bound directly in `id`, unordered.
    pub fn variable_names(&self, id: ScopeId) -> Result<Vec<Name>, EvalError> {
        Ok(self.record(id)?.vars.keys().copied().collect())
    }

    fn record(&self, id: ScopeId) -> Result<&ScopeRecord, EvalError> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.record.as_ref())
            .ok_or_else(|| stale(id))
    }

    fn record_mut(&mut self, id: ScopeId) -> Result<&mut ScopeRecord, EvalError> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.record.as_mut())
            .ok_or_else(|| stale(id))
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
fn stale(id: ScopeId) -> EvalError {
    internal(format!(
        "stale scope handle {}#{}",
        id.index, id.generation
    ))
}
