//! RAII guards for scope and frame management.
//!
//! [`ScopedInterpreter`] enters a fresh block scope under the innermost one
//! and restores the previous scope on drop, releasing the block's record.
//! [`FrameGuard`] does the same for a scripted method activation: it pushes
//! a call frame, switches the node arena to the method's own, and undoes
//! both on drop. Both run their cleanup during unwinding too.
//!
//! ```text
//! self.with_block_scope(|scoped| {
//!     scoped.exec_var_decl(decl)?;
//!     scoped.exec(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::Interpreter;
use crate::call_stack::CallFrame;
use crate::errors::EvalError;
use crate::scope::{ScopeId, ScopeKind};
use zoola_ir::{Name, NodeArena, Span};

/// Guard over a block scope. Derefs to the interpreter.
pub struct ScopedInterpreter<'a> {
    interpreter: &'a mut Interpreter,
    scope: ScopeId,
    previous: ScopeId,
}

impl ScopedInterpreter<'_> {
    /// The scope this guard entered.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.call_stack.swap(self.previous);
        self.interpreter.scopes.release(self.scope);
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Enter a block scope whose parent is the innermost scope.
    ///
    /// The scope is left, and released unless a method it declared is
    /// still held elsewhere, when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        let parent = self.call_stack.top();
        let scope = self.scopes.create(ScopeKind::Block, Some(parent));
        let previous = self.call_stack.swap(scope);
        ScopedInterpreter {
            interpreter: self,
            scope,
            previous,
        }
    }

    /// Run `f` inside a fresh block scope.
    pub fn with_block_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }
}

/// Guard over one scripted method activation.
pub(crate) struct FrameGuard<'a> {
    interpreter: &'a mut Interpreter,
    scope: ScopeId,
    previous_tree: Arc<NodeArena>,
}

impl<'a> FrameGuard<'a> {
    /// Push a frame whose innermost scope is `scope` and evaluate in `tree`.
    ///
    /// On a depth-limit fault nothing is pushed and `scope` is released.
    pub(crate) fn enter(
        interpreter: &'a mut Interpreter,
        scope: ScopeId,
        name: Name,
        call_span: Option<Span>,
        tree: &Arc<NodeArena>,
    ) -> Result<Self, EvalError> {
        let pushed = interpreter.call_stack.push(CallFrame {
            scope,
            name,
            call_span,
        });
        if let Err(err) = pushed {
            interpreter.scopes.release(scope);
            return Err(err);
        }
        let previous_tree = std::mem::replace(&mut interpreter.tree, Arc::clone(tree));
        Ok(FrameGuard {
            interpreter,
            scope,
            previous_tree,
        })
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.interpreter.call_stack.pop();
        self.interpreter.tree = Arc::clone(&self.previous_tree);
        self.interpreter.scopes.release(self.scope);
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}
