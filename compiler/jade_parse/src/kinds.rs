//! Node kinds and their parsing policies.
//!
//! The reparse loop is generic: everything kind-specific goes through
//! [`NodePolicy`]. A new kind is added by implementing the trait and mapping
//! the [`NodeKind`] to it; the loop itself does not change.

use std::fmt;

use bitflags::bitflags;
use jade_ir::{Span, TokenKind};

use crate::parser::EditorParser;

/// Kind of a parse node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Whole document.
    CompilationUnit,
    /// Class, interface, enum, record or annotation type declaration.
    TypeDecl,
    /// `{ ... }` body of a class, interface, record or annotation type.
    TypeBody,
    /// `{ ... }` body of an enum: constants, then members.
    EnumBody,
    /// Method or constructor declaration.
    MethodDecl,
    /// `{ ... }` body of a method or constructor.
    MethodBody,
    /// A comment standing on its own between units.
    Comment,
}

impl NodeKind {
    /// The policy that drives parsing of this kind.
    pub fn policy(self) -> &'static dyn NodePolicy {
        match self {
            NodeKind::CompilationUnit => &CompilationUnitPolicy,
            NodeKind::TypeDecl => &TYPE_DECL_SHELL,
            NodeKind::TypeBody => &TypeBodyPolicy,
            NodeKind::EnumBody => &EnumBodyPolicy,
            NodeKind::MethodDecl => &METHOD_DECL_SHELL,
            NodeKind::MethodBody => &MethodBodyPolicy,
            NodeKind::Comment => &CommentPolicy,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation unit",
            NodeKind::TypeDecl => "type declaration",
            NodeKind::TypeBody => "type body",
            NodeKind::EnumBody => "enum body",
            NodeKind::MethodDecl => "method declaration",
            NodeKind::MethodBody => "method body",
            NodeKind::Comment => "comment",
        }
    }

    /// True for the `{ ... }` kinds.
    pub const fn is_body(self) -> bool {
        matches!(
            self,
            NodeKind::TypeBody | NodeKind::EnumBody | NodeKind::MethodBody
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Declaration modifiers recorded on type and method nodes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        /// `default` on an interface method.
        const DEFAULT = 1 << 11;
        /// Contextual `sealed`.
        const SEALED = 1 << 12;
        /// Contextual `non-sealed`.
        const NON_SEALED = 1 << 13;
        /// At least one annotation precedes the declaration.
        const ANNOTATED = 1 << 14;
    }
}

impl Modifiers {
    /// The flag for a modifier keyword.
    pub fn from_token(kind: TokenKind) -> Option<Modifiers> {
        Some(match kind {
            TokenKind::Public => Modifiers::PUBLIC,
            TokenKind::Protected => Modifiers::PROTECTED,
            TokenKind::Private => Modifiers::PRIVATE,
            TokenKind::Static => Modifiers::STATIC,
            TokenKind::Abstract => Modifiers::ABSTRACT,
            TokenKind::Final => Modifiers::FINAL,
            TokenKind::Native => Modifiers::NATIVE,
            TokenKind::Synchronized => Modifiers::SYNCHRONIZED,
            TokenKind::Transient => Modifiers::TRANSIENT,
            TokenKind::Volatile => Modifiers::VOLATILE,
            TokenKind::Strictfp => Modifiers::STRICTFP,
            TokenKind::Default => Modifiers::DEFAULT,
            _ => return None,
        })
    }
}

/// Result of parsing one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartialParse {
    /// One unit consumed cleanly.
    Unit,
    /// One unit consumed, with a problem at `span` (absolute).
    Error { span: Span, message: String },
    /// The text no longer parses as this kind; the node must be discarded.
    Abandon,
}

/// Position of a unit among the units of its node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnitContext {
    /// No non-comment unit precedes this one in the node.
    pub first: bool,
}

/// Kind-specific hooks of the reparse loop.
pub trait NodePolicy: Sync {
    fn kind(&self) -> NodeKind;

    /// Whether a nested construct of kind `child` becomes a child node of
    /// this one. Rejected constructs are parsed into the current unit.
    fn is_delimiting_node(&self, child: NodeKind) -> bool;

    /// Consume one unit from the parser's current position.
    fn do_partial_parse(&self, parser: &mut EditorParser<'_, '_>, ctx: UnitContext)
        -> PartialParse;

    /// Whether `token` closes this node.
    fn is_node_end_marker(&self, token: TokenKind) -> bool;

    /// False for declaration shells: any damage escalates to the parent.
    fn reparses_in_place(&self) -> bool {
        true
    }

    /// Bytes of the opening delimiter. Damage there escalates.
    fn opener_len(&self) -> u32 {
        0
    }

    /// Whether running out of input before the end marker leaves the node
    /// unterminated.
    fn expects_end_marker(&self) -> bool {
        true
    }
}

/// The document root: package, imports and type declarations.
pub struct CompilationUnitPolicy;

impl NodePolicy for CompilationUnitPolicy {
    fn kind(&self) -> NodeKind {
        NodeKind::CompilationUnit
    }

    fn is_delimiting_node(&self, child: NodeKind) -> bool {
        matches!(child, NodeKind::TypeDecl | NodeKind::Comment)
    }

    fn do_partial_parse(&self, parser: &mut EditorParser<'_, '_>, _: UnitContext) -> PartialParse {
        parser.parse_top_level_unit()
    }

    fn is_node_end_marker(&self, _: TokenKind) -> bool {
        false
    }

    fn expects_end_marker(&self) -> bool {
        false
    }
}

/// Declarations whose headers are not reparsed in place.
pub struct DeclarationShell(NodeKind);

static TYPE_DECL_SHELL: DeclarationShell = DeclarationShell(NodeKind::TypeDecl);
static METHOD_DECL_SHELL: DeclarationShell = DeclarationShell(NodeKind::MethodDecl);

impl NodePolicy for DeclarationShell {
    fn kind(&self) -> NodeKind {
        self.0
    }

    fn is_delimiting_node(&self, child: NodeKind) -> bool {
        match self.0 {
            NodeKind::TypeDecl => matches!(child, NodeKind::TypeBody | NodeKind::EnumBody),
            NodeKind::MethodDecl => child == NodeKind::MethodBody,
            _ => false,
        }
    }

    fn do_partial_parse(&self, _: &mut EditorParser<'_, '_>, _: UnitContext) -> PartialParse {
        PartialParse::Abandon
    }

    fn is_node_end_marker(&self, _: TokenKind) -> bool {
        false
    }

    fn reparses_in_place(&self) -> bool {
        false
    }

    fn expects_end_marker(&self) -> bool {
        false
    }
}

/// Members of a class, interface, record or annotation type.
pub struct TypeBodyPolicy;

impl NodePolicy for TypeBodyPolicy {
    fn kind(&self) -> NodeKind {
        NodeKind::TypeBody
    }

    fn is_delimiting_node(&self, child: NodeKind) -> bool {
        matches!(
            child,
            NodeKind::TypeDecl | NodeKind::MethodDecl | NodeKind::MethodBody | NodeKind::Comment
        )
    }

    fn do_partial_parse(&self, parser: &mut EditorParser<'_, '_>, _: UnitContext) -> PartialParse {
        parser.parse_member_unit()
    }

    fn is_node_end_marker(&self, token: TokenKind) -> bool {
        token == TokenKind::RBrace
    }

    fn opener_len(&self) -> u32 {
        1
    }
}

/// Enum constants (the first unit), then members.
pub struct EnumBodyPolicy;

impl NodePolicy for EnumBodyPolicy {
    fn kind(&self) -> NodeKind {
        NodeKind::EnumBody
    }

    fn is_delimiting_node(&self, child: NodeKind) -> bool {
        TypeBodyPolicy.is_delimiting_node(child)
    }

    fn do_partial_parse(&self, parser: &mut EditorParser<'_, '_>, ctx: UnitContext) -> PartialParse {
        if ctx.first {
            parser.parse_enum_constants_unit()
        } else {
            parser.parse_member_unit()
        }
    }

    fn is_node_end_marker(&self, token: TokenKind) -> bool {
        token == TokenKind::RBrace
    }

    fn opener_len(&self) -> u32 {
        1
    }
}

/// Statements of a method, constructor or initializer body.
pub struct MethodBodyPolicy;

impl NodePolicy for MethodBodyPolicy {
    fn kind(&self) -> NodeKind {
        NodeKind::MethodBody
    }

    fn is_delimiting_node(&self, child: NodeKind) -> bool {
        matches!(child, NodeKind::TypeDecl | NodeKind::Comment)
    }

    fn do_partial_parse(&self, parser: &mut EditorParser<'_, '_>, _: UnitContext) -> PartialParse {
        parser.parse_statement_unit()
    }

    fn is_node_end_marker(&self, token: TokenKind) -> bool {
        token == TokenKind::RBrace
    }

    fn opener_len(&self) -> u32 {
        1
    }
}

/// A standalone comment. Its only token is its own end marker, so the
/// token that closes the node is the `*/` (or line end) that closes the
/// comment.
pub struct CommentPolicy;

impl NodePolicy for CommentPolicy {
    fn kind(&self) -> NodeKind {
        NodeKind::Comment
    }

    fn is_delimiting_node(&self, _: NodeKind) -> bool {
        false
    }

    fn do_partial_parse(&self, _: &mut EditorParser<'_, '_>, _: UnitContext) -> PartialParse {
        PartialParse::Abandon
    }

    fn is_node_end_marker(&self, token: TokenKind) -> bool {
        token.is_comment()
    }

    /// A comment is one token; any change to it is relexed by the parent.
    fn reparses_in_place(&self) -> bool {
        false
    }
}
