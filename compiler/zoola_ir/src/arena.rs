//! Flat storage for syntax-tree nodes.

use crate::ast::{Node, NodeKind};
use crate::{NodeId, Span};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an arena, used to key per-node caches.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArenaId(u64);

/// Owns every node of one parsed unit.
#[derive(Debug)]
pub struct NodeArena {
    id: ArenaId,
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            id: ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Append a node, returning its id.
    ///
    /// # Panics
    /// Panics if the arena already holds `u32::MAX` nodes.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .unwrap_or_else(|| panic!("node arena overflow"));
        self.nodes.push(Node { kind, span });
        NodeId::new(index)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).map_or(Span::DUMMY, |n| n.span)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished, immutable unit ready for evaluation.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    pub arena: Arc<NodeArena>,
    pub root: NodeId,
}

impl SyntaxTree {
    pub fn new(arena: NodeArena, root: NodeId) -> Self {
        SyntaxTree {
            arena: Arc::new(arena),
            root,
        }
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.arena.get(self.root)
    }
}
