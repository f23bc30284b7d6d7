//! Error recovery for the parser.
//!
//! Provides token sets and synchronization for continuing parsing after
//! errors. Uses bitset-based O(1) membership testing.
//!
//! Recovery never crosses a closing brace it did not open: braces decide
//! where nodes end, so skipping one would move a node boundary.

use jade_ir::{TokenKind, TokenSource};

use crate::cursor::TokenCursor;

/// A set of token kinds using bitset representation for O(1) membership testing.
///
/// Each bit in the u128 corresponds to a `TokenKind` discriminant index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSet(u128);

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create a token set containing a single token kind.
    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        Self(1u128 << kind.discriminant_index())
    }

    /// Add a token kind to this set (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind.discriminant_index()))
    }

    /// Union of two token sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if this set contains a token kind.
    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind.discriminant_index())) != 0
    }

    /// Check if this set is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Count the number of token kinds in this set.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Modifier keywords; any of them can start a declaration.
pub const MODIFIERS: TokenSet = TokenSet::new()
    .with(TokenKind::Public)
    .with(TokenKind::Protected)
    .with(TokenKind::Private)
    .with(TokenKind::Static)
    .with(TokenKind::Abstract)
    .with(TokenKind::Final)
    .with(TokenKind::Native)
    .with(TokenKind::Synchronized)
    .with(TokenKind::Transient)
    .with(TokenKind::Volatile)
    .with(TokenKind::Strictfp);

/// Keywords that introduce a type declaration.
pub const TYPE_KEYWORDS: TokenSet = TokenSet::new()
    .with(TokenKind::Class)
    .with(TokenKind::Interface)
    .with(TokenKind::Enum);

/// Recovery set for compilation-unit boundaries.
pub const TOP_LEVEL_BOUNDARY: TokenSet = MODIFIERS
    .union(TYPE_KEYWORDS)
    .with(TokenKind::Package)
    .with(TokenKind::Import)
    .with(TokenKind::At)
    .with(TokenKind::Semi);

/// Recovery set for member boundaries inside a type body.
pub const MEMBER_BOUNDARY: TokenSet = MODIFIERS
    .union(TYPE_KEYWORDS)
    .with(TokenKind::Void)
    .with(TokenKind::Semi);

/// Recovery set for statement boundaries.
pub const STATEMENT_BOUNDARY: TokenSet = TokenSet::single(TokenKind::Semi);

/// Advance the cursor until reaching a token in the recovery set at brace
/// depth zero, or an unmatched `}`, or EOF. Balanced `{ ... }` groups are
/// skipped whole.
///
/// Returns `true` if a recovery token was found; nothing past it is consumed.
pub fn synchronize<S: TokenSource>(cursor: &mut TokenCursor<S>, recovery: TokenSet) -> bool {
    let mut depth = 0u32;
    loop {
        let kind = cursor.current_kind();
        match kind {
            TokenKind::Eof => return false,
            _ if depth == 0 && recovery.contains(kind) => return true,
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace if depth == 0 => return false,
            TokenKind::RBrace => depth -= 1,
            _ => {}
        }
        cursor.bump();
    }
}
