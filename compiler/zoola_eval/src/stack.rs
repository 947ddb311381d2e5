//! Native stack growth for deep recursive evaluation.
//!
//! On wasm32 the closure runs directly.

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Space kept free before growing (100 KiB).
    const RED_ZONE: usize = 100 * 1024;

    /// Size of each new stack segment (1 MiB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
