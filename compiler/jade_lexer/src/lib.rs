//! Java lexer for the Jade parse tree.
//!
//! A single hand-written scanner that can start at any character boundary
//! and stop at any limit, so the incremental parser can re-lex exactly the
//! region of one node:
//!
//! ```
//! use jade_ir::{TokenKind, TokenSource};
//! use jade_lexer::Lexer;
//!
//! let source = "class A { int x; }";
//! // Re-lex the body contents only.
//! let mut lexer = Lexer::bounded(source, 9, 17);
//! assert_eq!(lexer.next_token().kind, TokenKind::Int);
//! assert_eq!(lexer.next_token().kind, TokenKind::Ident);
//! assert_eq!(lexer.next_token().kind, TokenKind::Semi);
//! assert_eq!(lexer.next_token().kind, TokenKind::Eof);
//! ```

mod cursor;
mod keywords;
mod scanner;

pub use cursor::Cursor;
pub use scanner::{lex, Lexer};

/// True for bytes Java treats as whitespace between tokens.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}
