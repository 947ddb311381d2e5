//! Per-node cache of generated classes.
//!
//! A class declaration is generated once; evaluating the same node again
//! returns the cached type. Generation runs under the cache lock, so two
//! contexts racing on one declaration generate it once.

use crate::errors::EvalError;
use crate::value::TypeRef;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use zoola_ir::{ArenaId, NodeId};

#[derive(Debug, Default)]
pub struct ClassCache {
    types: Mutex<FxHashMap<(ArenaId, NodeId), TypeRef>>,
}

impl ClassCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached type of the declaration at `node`, generating it on a miss.
    pub fn get_or_generate(
        &self,
        arena: ArenaId,
        node: NodeId,
        generate: impl FnOnce() -> Result<TypeRef, EvalError>,
    ) -> Result<TypeRef, EvalError> {
        let mut types = self.types.lock();
        if let Some(ty) = types.get(&(arena, node)) {
            return Ok(ty.clone());
        }
        tracing::debug!(node = node.index(), "class cache miss");
        let ty = generate()?;
        types.insert((arena, node), ty.clone());
        Ok(ty)
    }

    pub fn len(&self) -> usize {
        self.types.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.lock().is_empty()
    }
}
