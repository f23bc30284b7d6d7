//! Edit descriptions for the incremental parse tree.
//!
//! A [`TextChange`] is an edit as reported by the editing surface: a region
//! `[start, old_end)` of the old text replaced by `new_len` bytes. The tree
//! applies it node by node after re-basing it into each node's relative
//! coordinates with [`TextChange::relative_to`].

use crate::Span;

/// A single text edit.
///
/// Represents a change where the region `[start, old_end)` in the old text is
/// replaced with `new_len` bytes of new text.
///
/// # Examples
///
/// ```
/// use jade_ir::TextChange;
///
/// // Typing 5 bytes at position 10
/// let typed = TextChange::replace(10, 0, 5);
/// assert!(typed.is_insertion());
/// assert_eq!(typed.delta(), 5);
///
/// // Replacing 3 bytes with 5 bytes at position 0
/// let replaced = TextChange::replace(0, 3, 5);
/// assert_eq!(replaced.delta(), 2);
/// assert_eq!(replaced.new_span().end, 5);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TextChange {
    /// Start byte offset in old text.
    pub start: u32,
    /// End byte offset in old text (exclusive).
    pub old_end: u32,
    /// Length of replacement text in bytes.
    pub new_len: u32,
}

impl TextChange {
    /// Create a replacement. This is the shape of an editor notification
    /// `(offset, removed_length, inserted_length)`.
    #[inline]
    pub const fn replace(start: u32, old_len: u32, new_len: u32) -> Self {
        TextChange {
            start,
            old_end: start + old_len,
            new_len,
        }
    }

    /// Net change in document length (positive = grew, negative = shrank).
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.new_len) - i64::from(self.old_end - self.start)
    }

    /// True if nothing is removed.
    #[inline]
    pub const fn is_insertion(&self) -> bool {
        self.start == self.old_end
    }

    /// The removed region in old-text coordinates.
    #[inline]
    pub const fn old_span(&self) -> Span {
        Span::new(self.start, self.old_end)
    }

    /// The inserted region in new-text coordinates.
    #[inline]
    pub const fn new_span(&self) -> Span {
        Span::new(self.start, self.start + self.new_len)
    }

    /// The same change expressed relative to `base` (a node's start).
    ///
    /// `base` must not be after `start`.
    #[inline]
    #[must_use]
    pub const fn relative_to(&self, base: u32) -> TextChange {
        TextChange {
            start: self.start - base,
            old_end: self.old_end - base,
            new_len: self.new_len,
        }
    }
}
