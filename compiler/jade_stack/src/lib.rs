//! Stack growth for deep recursion.
//!
//! Java bodies, blocks and generic signatures nest without a fixed bound,
//! and both the structural parser and the signature decoder descend them
//! recursively. Recursive entry points run through
//! [`ensure_sufficient_stack`], which moves execution onto a fresh stack
//! segment when the current one is nearly used up.
//!
//! On `wasm32` the closure is called directly.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// within [`RED_ZONE`] of overflowing.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
