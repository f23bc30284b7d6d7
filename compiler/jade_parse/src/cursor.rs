//! Token cursor over a pull-based token source.
//!
//! The cursor buffers tokens lazily, so it knows exactly how far the parser
//! has looked ahead ([`TokenCursor::lexed_end`]). Comments are kept in the
//! buffer: [`TokenCursor::current_raw`] sees them (units may start with a
//! comment), while [`TokenCursor::current`] and [`TokenCursor::nth`] skip
//! them for the grammar.

use std::collections::VecDeque;

use jade_ir::{Span, Token, TokenKind, TokenSource};

/// Cursor for navigating tokens with unbounded lookahead.
pub struct TokenCursor<S> {
    source: S,
    buffer: VecDeque<Token>,
    /// Set once the source produced `Eof`; it is kept as the buffer's last
    /// token and never consumed.
    eof: Option<Token>,
    previous: Option<Token>,
    lexed_end: u32,
    consumed: usize,
    /// Last token that ends wherever its input ends: a line comment, or a
    /// comment or literal that ran out of input.
    open_ended: Option<Token>,
}

impl<S: TokenSource> TokenCursor<S> {
    pub fn new(source: S) -> Self {
        let start = source.position();
        TokenCursor {
            source,
            buffer: VecDeque::new(),
            eof: None,
            previous: None,
            lexed_end: start,
            consumed: 0,
            open_ended: None,
        }
    }

    /// Make sure at least `n + 1` raw tokens are buffered, or `Eof` is.
    fn fill(&mut self, n: usize) {
        while self.buffer.len() <= n && self.eof.is_none() {
            let token = self.source.next_token();
            self.lexed_end = self.lexed_end.max(token.span.end);
            if token.kind == TokenKind::LineComment
                || (token.kind.is_error() && token.kind != TokenKind::Unknown)
            {
                self.open_ended = Some(token);
            }
            if token.kind == TokenKind::Eof {
                self.eof = Some(token);
            }
            self.buffer.push_back(token);
        }
    }

    /// Raw token `n` positions ahead, comments included.
    fn raw(&mut self, n: usize) -> Token {
        self.fill(n);
        match self.buffer.get(n) {
            Some(token) => *token,
            None => self.eof_token(),
        }
    }

    fn eof_token(&self) -> Token {
        self.eof
            .or_else(|| self.buffer.back().copied())
            .unwrap_or(Token::new(TokenKind::Eof, Span::point(self.lexed_end)))
    }

    /// The next raw token, which may be a comment.
    #[inline]
    pub fn current_raw(&mut self) -> Token {
        self.raw(0)
    }

    /// Consume the next raw token. `Eof` is never consumed.
    pub fn bump_raw(&mut self) -> Token {
        let token = self.raw(0);
        if token.kind != TokenKind::Eof {
            self.buffer.pop_front();
            self.previous = Some(token);
            self.consumed += 1;
        }
        token
    }

    /// The `n`-th significant token ahead (comments skipped).
    pub fn nth(&mut self, n: usize) -> Token {
        let mut seen = 0;
        let mut i = 0;
        loop {
            let token = self.raw(i);
            if token.kind == TokenKind::Eof {
                return token;
            }
            if !token.kind.is_trivia() {
                if seen == n {
                    return token;
                }
                seen += 1;
            }
            i += 1;
        }
    }

    /// The next significant token.
    #[inline]
    pub fn current(&mut self) -> Token {
        self.nth(0)
    }

    #[inline]
    pub fn current_kind(&mut self) -> TokenKind {
        self.nth(0).kind
    }

    #[inline]
    pub fn nth_kind(&mut self, n: usize) -> TokenKind {
        self.nth(n).kind
    }

    #[inline]
    pub fn at(&mut self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub fn is_at_end(&mut self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Consume comments and the next significant token.
    pub fn bump(&mut self) -> Token {
        while self.raw(0).kind.is_trivia() {
            self.bump_raw();
        }
        self.bump_raw()
    }

    /// Consume the next significant token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// The last consumed token, if any.
    #[inline]
    pub fn previous(&self) -> Option<Token> {
        self.previous
    }

    /// Span of the last consumed token, or a point at the cursor start.
    pub fn previous_span(&self) -> Span {
        self.previous
            .map_or(Span::point(self.start_position()), |token| token.span)
    }

    /// End of the last consumed token.
    pub fn last_end(&self) -> u32 {
        self.previous
            .map_or(self.start_position(), |token| token.span.end)
    }

    fn start_position(&self) -> u32 {
        self.buffer
            .front()
            .map_or(self.source.position(), |token| token.span.start)
    }

    /// End of the furthest token lexed so far.
    #[inline]
    pub fn lexed_end(&self) -> u32 {
        self.lexed_end
    }

    /// The last line comment, or unterminated comment or literal, lexed so
    /// far. When it ends at the stream limit it may really extend further.
    #[inline]
    pub fn open_ended(&self) -> Option<Token> {
        self.open_ended
    }

    /// Number of tokens consumed so far. Used for progress checks.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}
