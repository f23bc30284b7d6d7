//! Java token vocabulary.
//!
//! Tokens carry no text: the kind plus the span into the document is enough,
//! and the text is read back from the document when needed. Contextual
//! keywords (`record`, `sealed`, `permits`, `var`, `yield`) lex as
//! [`TokenKind::Ident`] and are recognized by the parser from the text.

use std::fmt;

use crate::Span;

/// Kind of a Java token.
///
/// # Invariant
///
/// All discriminants are below 128 so that a kind fits a bit of the
/// parser's `u128` token sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // === Literals ===
    Ident,
    IntLit,
    FloatLit,
    CharLit,
    StringLit,
    TextBlock,

    // === Comments ===
    LineComment,
    BlockComment,
    DocComment,

    // === Keywords ===
    Abstract,
    Assert,
    Boolean,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extends,
    False,
    Final,
    Finally,
    Float,
    For,
    Goto,
    If,
    Implements,
    Import,
    Instanceof,
    Int,
    Interface,
    Long,
    Native,
    New,
    Null,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    Throws,
    Transient,
    True,
    Try,
    Void,
    Volatile,
    While,

    // === Punctuation ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    At,
    Colon,
    ColonColon,
    Question,
    Arrow,
    Eq,
    Lt,
    Gt,
    Bang,
    Tilde,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    Percent,

    // === Malformed input ===
    UnterminatedComment,
    UnterminatedString,
    UnterminatedChar,
    Unknown,

    /// End of the token stream (end of document or of the bounded region).
    Eof,
}

impl TokenKind {
    /// Index used by bitset token sets.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// True for the three comment kinds (terminated comments only).
    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }

    /// True for tokens the parser never sees inside a unit: comments,
    /// including a comment that runs to the end of the stream.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        self.is_comment() || matches!(self, TokenKind::UnterminatedComment)
    }

    /// True for declaration modifiers (annotations are handled separately).
    #[inline]
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Abstract
                | TokenKind::Final
                | TokenKind::Native
                | TokenKind::Synchronized
                | TokenKind::Transient
                | TokenKind::Volatile
                | TokenKind::Strictfp
                | TokenKind::Default
        )
    }

    /// True for the primitive type keywords, `void` included.
    #[inline]
    pub const fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Void
        )
    }

    /// True for tokens produced from malformed input.
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::UnterminatedComment
                | TokenKind::UnterminatedString
                | TokenKind::UnterminatedChar
                | TokenKind::Unknown
        )
    }

    /// Human-readable name used in diagnostics.
    pub const fn display_name(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::IntLit | TokenKind::FloatLit => "number",
            TokenKind::CharLit => "character literal",
            TokenKind::StringLit | TokenKind::TextBlock => "string literal",
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment => {
                "comment"
            }
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semi => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::At => "`@`",
            TokenKind::Colon => "`:`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Question => "`?`",
            TokenKind::Arrow => "`->`",
            TokenKind::Eq => "`=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::UnterminatedComment => "unterminated comment",
            TokenKind::UnterminatedString => "unterminated string",
            TokenKind::UnterminatedChar => "unterminated character literal",
            TokenKind::Unknown => "unknown character",
            TokenKind::Eof => "end of input",
            TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Amp
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Percent => "operator",
            _ => "keyword",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A token: kind plus absolute span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// The token text, read back from the document it was lexed from.
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.to_range()).unwrap_or("")
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Token;
    crate::static_assert_size!(Token, 12);
}

/// Pull-based token stream.
///
/// The parser only consumes tokens; it never owns lexer state beyond the
/// resumable position reported by [`TokenSource::position`]. Once the stream
/// is exhausted, every further call returns an `Eof` token.
pub trait TokenSource {
    /// Produce the next token, including comments.
    fn next_token(&mut self) -> Token;

    /// Offset at which the next call to `next_token` starts scanning.
    fn position(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_fit_in_token_set() {
        assert!(TokenKind::Eof.discriminant_index() < 128);
    }

    #[test]
    fn comment_classification() {
        assert!(TokenKind::DocComment.is_comment());
        assert!(!TokenKind::UnterminatedComment.is_comment());
        assert!(TokenKind::UnterminatedComment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
    }

    #[test]
    fn token_text_reads_back_from_source() {
        let source = "int x;";
        let token = Token::new(TokenKind::Ident, Span::new(4, 5));
        assert_eq!(token.text(source), "x");
    }

    #[test]
    fn modifiers_and_primitives() {
        assert!(TokenKind::Static.is_modifier());
        assert!(!TokenKind::Class.is_modifier());
        assert!(TokenKind::Void.is_primitive_type());
        assert!(!TokenKind::Ident.is_primitive_type());
    }
}
