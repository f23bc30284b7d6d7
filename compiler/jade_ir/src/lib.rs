//! Jade IR - shared vocabulary for the incremental Java parse tree
//!
//! This crate contains the small, dependency-free types every other Jade crate
//! speaks:
//! - Spans for source locations (byte offsets)
//! - Text edits and the saturating offset shift applied across them
//! - Java token kinds, tokens, and the pull-based `TokenSource` interface
//!
//! # Design Philosophy
//!
//! - **Offsets, not pointers**: every location is a `u32` byte offset.
//! - **Copy everywhere**: spans, tokens and edits are plain `Copy` values.
//! - **Interface Segregation**: the lexer and the parser only meet through
//!   [`TokenSource`].

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod incremental;
mod span;
mod token;

pub use incremental::TextChange;
pub use span::{shift, Span};
pub use token::{Token, TokenKind, TokenSource};
