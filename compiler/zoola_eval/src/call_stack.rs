//! Per-context call stack.
//!
//! Each frame is one dynamic activation: the global frame at the bottom, one
//! frame per scripted method invocation above it. A frame's `scope` is the
//! innermost scope active in that activation; entering a block *swaps* the
//! top frame's scope and leaving restores it.
//!
//! Frames also carry the method name and call-site span so a fault can
//! snapshot the stack into an [`EvalBacktrace`].

use crate::errors::{stack_overflow, BacktraceFrame, EvalBacktrace, EvalError};
use crate::scope::ScopeId;
use zoola_ir::{Name, Span, StringInterner};

/// One activation.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Innermost active scope of this activation.
    pub scope: ScopeId,
    /// Method name; empty for the global frame.
    pub name: Name,
    /// Where the call was made.
    pub call_span: Option<Span>,
}

#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    global: ScopeId,
    max_depth: Option<usize>,
}

impl CallStack {
    /// Stack holding only the global frame.
    pub fn new(global: ScopeId, max_depth: Option<usize>) -> Self {
        CallStack {
            frames: vec![CallFrame {
                scope: global,
                name: Name::EMPTY,
                call_span: None,
            }],
            global,
            max_depth,
        }
    }

    /// Innermost active scope.
    pub fn top(&self) -> ScopeId {
        self.frames.last().map_or(self.global, |f| f.scope)
    }

    /// Replace the innermost scope, returning the previous one.
    pub fn swap(&mut self, scope: ScopeId) -> ScopeId {
        match self.frames.last_mut() {
            Some(frame) => std::mem::replace(&mut frame.scope, scope),
            None => std::mem::replace(&mut self.global, scope),
        }
    }

    /// Push an activation, enforcing the depth limit. The frame is not
    /// pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() > max {
                return Err(stack_overflow(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the innermost activation. The global frame stays.
    pub fn pop(&mut self) -> Option<CallFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pop activations until `depth` remain; returns how many were popped.
    pub fn truncate(&mut self, depth: usize) -> usize {
        let keep = depth.max(1);
        let popped = self.frames.len().saturating_sub(keep);
        self.frames.truncate(keep);
        popped
    }

    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    /// Snapshot for a fault, innermost activation first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        EvalBacktrace {
            frames: self
                .frames
                .iter()
                .rev()
                .map(|frame| BacktraceFrame {
                    name: if frame.name == Name::EMPTY {
                        "<global>".to_owned()
                    } else {
                        interner.lookup(frame.name).to_owned()
                    },
                    span: frame.call_span,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopeArena, ScopeKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn swap_returns_previous_top() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        let block = arena.create(ScopeKind::Block, Some(global));
        let mut stack = CallStack::new(global, None);
        assert_eq!(stack.swap(block), global);
        assert_eq!(stack.top(), block);
        assert_eq!(stack.swap(global), block);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn global_frame_survives_pop_and_truncate() {
        let arena = ScopeArena::new();
        let mut stack = CallStack::new(arena.global(), None);
        assert!(stack.pop().is_none());
        assert_eq!(stack.truncate(0), 0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn push_respects_depth_limit() {
        let arena = ScopeArena::new();
        let global = arena.global();
        let mut stack = CallStack::new(global, Some(2));
        let frame = CallFrame {
            scope: global,
            name: Name::EMPTY,
            call_span: None,
        };
        assert!(stack.push(frame.clone()).is_ok());
        assert!(stack.push(frame.clone()).is_ok());
        assert!(stack.push(frame).is_err());
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.truncate(1), 2);
    }

    #[test]
    fn capture_lists_innermost_first() {
        let interner = StringInterner::new();
        let arena = ScopeArena::new();
        let global = arena.global();
        let mut stack = CallStack::new(global, None);
        stack
            .push(CallFrame {
                scope: global,
                name: interner.intern("fib"),
                call_span: Some(Span::new(4, 9)),
            })
            .ok();
        let bt = stack.capture(&interner);
        let names: Vec<&str> = bt.frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fib", "<global>"]);
    }
}
