//! Hand-written Java scanner.
//!
//! [`Lexer`] produces one [`Token`] per call through [`TokenSource`]. It
//! skips whitespace but reports comments, so the parser can decide which
//! comments become tree nodes. Malformed input never fails: unterminated
//! literals and comments and stray characters come back as error kinds.
//!
//! # Design
//!
//! Main dispatch is on the current byte. Each arm calls a focused method that
//! advances the cursor and returns the token kind. The `0x00` returned at the
//! limit dispatches to EOF unless it is an interior null byte.

use jade_ir::{Span, Token, TokenKind, TokenSource};

use crate::cursor::Cursor;
use crate::keywords;

/// Resumable, bounded Java scanner.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Scan the whole document.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "documents are limited to u32::MAX bytes by Span"
    )]
    pub fn new(source: &'a str) -> Self {
        Self::bounded(source, 0, source.len() as u32)
    }

    /// Scan `source[start..limit]`. The stream reports `Eof` at `limit`;
    /// a construct that would cross the limit is cut there and reported as
    /// unterminated.
    pub fn bounded(source: &'a str, start: u32, limit: u32) -> Self {
        Lexer {
            cursor: Cursor::new(source, start, limit),
        }
    }

    /// The offset at which the stream ends.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.cursor.limit()
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.cursor.eat_whitespace();
        let start = self.cursor.pos();
        let kind = self.scan(start);
        Token::new(kind, Span::new(start, self.cursor.pos()))
    }

    fn scan(&mut self, start: u32) -> TokenKind {
        match self.cursor.current() {
            0 if self.cursor.is_eof() => TokenKind::Eof,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.identifier(start),
            b'0'..=b'9' => self.number(),
            b'"' => self.string(),
            b'\'' => self.char_literal(),
            b'/' => self.slash_or_comment(),
            b'.' => self.dot(),
            b'-' => self.minus_or_arrow(),
            b':' => self.colon(),
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b';' => self.single(TokenKind::Semi),
            b',' => self.single(TokenKind::Comma),
            b'@' => self.single(TokenKind::At),
            b'?' => self.single(TokenKind::Question),
            b'=' => self.single(TokenKind::Eq),
            b'<' => self.single(TokenKind::Lt),
            b'>' => self.single(TokenKind::Gt),
            b'!' => self.single(TokenKind::Bang),
            b'~' => self.single(TokenKind::Tilde),
            b'+' => self.single(TokenKind::Plus),
            b'*' => self.single(TokenKind::Star),
            b'&' => self.single(TokenKind::Amp),
            b'|' => self.single(TokenKind::Pipe),
            b'^' => self.single(TokenKind::Caret),
            b'%' => self.single(TokenKind::Percent),
            0x80..=0xFF => self.non_ascii(start),
            _ => self.single(TokenKind::Unknown),
        }
    }

    #[inline]
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    // === Identifiers & Keywords ===

    fn identifier(&mut self, start: u32) -> TokenKind {
        self.eat_identifier_tail();
        let text = self.cursor.slice(start, self.cursor.pos());
        keywords::lookup(text).unwrap_or(TokenKind::Ident)
    }

    fn eat_identifier_tail(&mut self) {
        loop {
            let b = self.cursor.current();
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.cursor.advance();
            } else if b >= 0x80 {
                match self.cursor.current_char() {
                    Some(c) if c.is_alphanumeric() => self.cursor.advance_char(),
                    _ => break,
                }
            } else {
                break;
            }
        }
    }

    fn non_ascii(&mut self, start: u32) -> TokenKind {
        match self.cursor.current_char() {
            Some(c) if c.is_alphabetic() => {
                self.cursor.advance_char();
                self.identifier(start)
            }
            _ => {
                self.cursor.advance_char();
                TokenKind::Unknown
            }
        }
    }

    // === Numbers ===

    fn number(&mut self) -> TokenKind {
        let c = &mut self.cursor;
        if c.current() == b'0' && matches!(c.peek(), b'x' | b'X') {
            c.advance_n(2);
            c.eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
            let mut float = false;
            if c.current() == b'.' {
                float = true;
                c.advance();
                c.eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
            }
            if matches!(c.current(), b'p' | b'P') {
                float = true;
                self.exponent_tail();
            }
            return self.number_suffix(float);
        }
        if c.current() == b'0' && matches!(c.peek(), b'b' | b'B') {
            c.advance_n(2);
            c.eat_while(|b| matches!(b, b'0' | b'1' | b'_'));
            return self.number_suffix(false);
        }

        c.eat_while(|b| b.is_ascii_digit() || b == b'_');
        let mut float = false;
        if c.current() == b'.' && Self::dot_continues_number(c.peek()) {
            float = true;
            c.advance();
            c.eat_while(|b| b.is_ascii_digit() || b == b'_');
        }
        if matches!(self.cursor.current(), b'e' | b'E') {
            float = true;
            self.exponent_tail();
        }
        self.number_suffix(float)
    }

    /// `1.5`, `1.e3`, `1.f` and `1.` continue the literal; `1..` and a
    /// member access like `1.foo` do not.
    fn dot_continues_number(next: u8) -> bool {
        next.is_ascii_digit()
            || matches!(next, b'e' | b'E' | b'f' | b'F' | b'd' | b'D')
            || !(next.is_ascii_alphabetic() || next == b'_' || next == b'.')
    }

    fn exponent_tail(&mut self) {
        self.cursor.advance();
        if matches!(self.cursor.current(), b'+' | b'-') {
            self.cursor.advance();
        }
        self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
    }

    fn number_suffix(&mut self, float: bool) -> TokenKind {
        match self.cursor.current() {
            b'l' | b'L' => {
                self.cursor.advance();
                TokenKind::IntLit
            }
            b'f' | b'F' | b'd' | b'D' => {
                self.cursor.advance();
                TokenKind::FloatLit
            }
            _ if float => TokenKind::FloatLit,
            _ => TokenKind::IntLit,
        }
    }

    // === Strings & Characters ===

    fn string(&mut self) -> TokenKind {
        if self.cursor.peek() == b'"' && self.cursor.peek2() == b'"' {
            return self.text_block();
        }
        self.cursor.advance();
        if self.quoted_tail(b'"') {
            TokenKind::StringLit
        } else {
            TokenKind::UnterminatedString
        }
    }

    fn char_literal(&mut self) -> TokenKind {
        self.cursor.advance();
        if self.quoted_tail(b'\'') {
            TokenKind::CharLit
        } else {
            TokenKind::UnterminatedChar
        }
    }

    /// Consume the body and closing quote of a single-line literal. Returns
    /// false when a line break or the limit comes first; the line break is
    /// left unconsumed.
    fn quoted_tail(&mut self, quote: u8) -> bool {
        loop {
            match self.cursor.skip_to_quote_delim(quote) {
                b'\\' => {
                    self.cursor.advance();
                    if matches!(self.cursor.current(), b'\n' | b'\r') {
                        return false;
                    }
                    self.cursor.advance_char();
                }
                b'\n' | b'\r' => return false,
                0 if self.cursor.is_eof() => return false,
                _ => {
                    self.cursor.advance();
                    return true;
                }
            }
        }
    }

    fn text_block(&mut self) -> TokenKind {
        self.cursor.advance_n(3);
        loop {
            match self.cursor.current() {
                0 if self.cursor.is_eof() => return TokenKind::UnterminatedString,
                b'\\' => {
                    self.cursor.advance();
                    self.cursor.advance_char();
                }
                b'"' if self.cursor.peek() == b'"' && self.cursor.peek2() == b'"' => {
                    self.cursor.advance_n(3);
                    return TokenKind::TextBlock;
                }
                _ => self.cursor.advance_char(),
            }
        }
    }

    // === Comments ===

    fn slash_or_comment(&mut self) -> TokenKind {
        match self.cursor.peek() {
            b'/' => {
                self.cursor.eat_until_newline_or_eof();
                TokenKind::LineComment
            }
            b'*' => {
                // `/**/` is an empty block comment, not a doc comment.
                let doc = self.cursor.peek2() == b'*' && {
                    let mut ahead = self.cursor;
                    ahead.advance_n(3);
                    ahead.current() != b'/'
                };
                self.cursor.advance_n(2);
                if !self.cursor.eat_block_comment_tail() {
                    TokenKind::UnterminatedComment
                } else if doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::BlockComment
                }
            }
            _ => self.single(TokenKind::Slash),
        }
    }

    // === Punctuation ===

    fn dot(&mut self) -> TokenKind {
        let next = self.cursor.peek();
        if next.is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            if matches!(self.cursor.current(), b'e' | b'E') {
                self.exponent_tail();
            }
            return self.number_suffix(true);
        }
        if next == b'.' && self.cursor.peek2() == b'.' {
            self.cursor.advance_n(3);
            return TokenKind::Ellipsis;
        }
        self.single(TokenKind::Dot)
    }

    fn minus_or_arrow(&mut self) -> TokenKind {
        if self.cursor.peek() == b'>' {
            self.cursor.advance_n(2);
            TokenKind::Arrow
        } else {
            self.single(TokenKind::Minus)
        }
    }

    fn colon(&mut self) -> TokenKind {
        if self.cursor.peek() == b':' {
            self.cursor.advance_n(2);
            TokenKind::ColonColon
        } else {
            self.single(TokenKind::Colon)
        }
    }
}

impl TokenSource for Lexer<'_> {
    #[inline]
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }

    #[inline]
    fn position(&self) -> u32 {
        self.cursor.pos()
    }
}

/// Lex a whole document, comments included, without the trailing `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            return tokens;
        }
        tokens.push(token);
    }
}

#[cfg(test)]
mod tests;
