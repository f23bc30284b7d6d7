//! Byte cursor over a bounded window of the document.
//!
//! The cursor never reads at or past `limit`: [`Cursor::current`] and the
//! peek methods return `0x00` there, so the scanner's dispatch treats the
//! limit exactly like the end of the document. A node re-parse bounds the
//! cursor at the node's end, which is how a node's token stream ends at its
//! extent.
//!
//! # Interior Null Bytes
//!
//! A null byte before the limit is content, not EOF. Use
//! [`Cursor::is_eof`] to tell them apart.

/// Returns the earliest (minimum) of two optional positions.
///
/// Combines the results of separate memchr calls when more needles are
/// needed than `memchr3` accepts.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Cursor over `source[..limit]`.
///
/// The cursor is [`Copy`], enabling cheap snapshots for lookahead.
///
/// # Invariant
///
/// `pos <= limit <= source.len()`, and both `pos` and `limit` lie on UTF-8
/// character boundaries.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: u32,
    limit: u32,
}

const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a cursor at `pos`, bounded at `limit`.
    ///
    /// Both offsets are clamped to the source length; `pos` is clamped to
    /// `limit`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "documents are limited to u32::MAX bytes by Span"
    )]
    pub fn new(source: &'a str, pos: u32, limit: u32) -> Self {
        let len = source.len() as u32;
        let limit = limit.min(len);
        debug_assert!(
            source.is_char_boundary(limit as usize),
            "limit must be a char boundary"
        );
        let pos = pos.min(limit);
        debug_assert!(
            source.is_char_boundary(pos as usize),
            "start must be a char boundary"
        );
        Self { source, pos, limit }
    }

    #[inline]
    fn byte_at(&self, pos: u32) -> u8 {
        if pos < self.limit {
            self.source.as_bytes()[pos as usize]
        } else {
            0
        }
    }

    /// Returns the byte at the current position, or `0x00` at the limit.
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Returns the byte one position ahead of current.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    /// Returns the byte two positions ahead of current.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.byte_at(self.pos + 2)
    }

    /// Advance by one byte. Does nothing at the limit.
    #[inline]
    pub fn advance(&mut self) {
        if self.pos < self.limit {
            self.pos += 1;
        }
    }

    /// Advance by `n` bytes, stopping at the limit.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos = (self.pos + n).min(self.limit);
    }

    /// Advance past one whole UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = self.current_char().map_or(1, char::len_utf8);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "a char is at most 4 bytes"
        )]
        self.advance_n(width as u32);
    }

    /// The character starting at the current position.
    #[inline]
    pub fn current_char(&self) -> Option<char> {
        self.source
            .get(self.pos as usize..self.limit as usize)
            .and_then(|rest| rest.chars().next())
    }

    /// True once the cursor reached the limit.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.limit
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Source text between two offsets.
    #[inline]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        self.source.get(start as usize..end as usize).unwrap_or("")
    }

    /// Consume bytes while the predicate holds.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Consume Java whitespace (space, tab, form feed, CR, LF).
    #[inline]
    pub fn eat_whitespace(&mut self) {
        self.eat_while(crate::is_whitespace);
    }

    #[inline]
    fn remaining(&self) -> &'a [u8] {
        &self.source.as_bytes()[self.pos as usize..self.limit as usize]
    }

    /// Move to the next `\n` (not consumed) or to the limit.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offset is bounded by limit, which is a u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = self.remaining();
        let found = earliest_of(
            memchr::memchr(b'\n', remaining),
            memchr::memchr(b'\r', remaining),
        );
        match found {
            Some(offset) => self.pos += offset as u32,
            None => self.pos = self.limit,
        }
    }

    /// Consume through the next `*/`. Returns false (cursor at the limit)
    /// when the comment is not closed before the limit.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offset is bounded by limit, which is a u32"
    )]
    pub fn eat_block_comment_tail(&mut self) -> bool {
        loop {
            match memchr::memchr(b'*', self.remaining()) {
                Some(offset) => {
                    self.pos += offset as u32 + 1;
                    if self.current() == b'/' && !self.is_eof() {
                        self.pos += 1;
                        return true;
                    }
                }
                None => {
                    self.pos = self.limit;
                    return false;
                }
            }
        }
    }

    /// Skip to the next byte that can end or interrupt a quoted literal:
    /// `quote`, `\`, or a line break. Returns that byte without consuming
    /// it, or `0` at the limit.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offset is bounded by limit, which is a u32"
    )]
    pub fn skip_to_quote_delim(&mut self, quote: u8) -> u8 {
        let remaining = self.remaining();
        let found = earliest_of(
            memchr::memchr3(quote, b'\\', b'\n', remaining),
            memchr::memchr(b'\r', remaining),
        );
        match found {
            Some(offset) => {
                self.pos += offset as u32;
                self.current()
            }
            None => {
                self.pos = self.limit;
                0
            }
        }
    }
}
