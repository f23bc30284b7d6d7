//! Declarations: compilation-unit items, type declarations, members and
//! enum constants.

use jade_ir::TokenKind;

use super::EditorParser;
use crate::kinds::{Modifiers, NodeKind, PartialParse};
use crate::recovery::{self, TokenSet, MODIFIERS, TYPE_KEYWORDS};

/// Where a type header can end when its body is missing.
const TYPE_HEADER_STOP: TokenSet = MODIFIERS
    .union(TYPE_KEYWORDS)
    .with(TokenKind::LBrace)
    .with(TokenKind::Semi);

/// Where a method header (`throws`, array dimensions) ends.
const METHOD_HEADER_STOP: TokenSet = TokenSet::new()
    .with(TokenKind::LBrace)
    .with(TokenKind::Semi)
    .with(TokenKind::Default);

const SEMI: TokenSet = TokenSet::single(TokenKind::Semi);

impl EditorParser<'_, '_> {
    /// One compilation-unit item: `package`, `import`, a type declaration
    /// or a stray `;`. Members outside any type are parsed flat.
    pub fn parse_top_level_unit(&mut self) -> PartialParse {
        let token = self.current();
        match token.kind {
            TokenKind::Package | TokenKind::Import => {
                self.bump();
                self.finish_with_semi();
                PartialParse::Unit
            }
            TokenKind::Semi => {
                self.bump();
                PartialParse::Unit
            }
            TokenKind::RBrace => {
                self.bump();
                PartialParse::Error {
                    span: token.span,
                    message: "unexpected `}`".to_string(),
                }
            }
            _ => {
                let modifiers = self.parse_modifiers();
                if self.at_type_decl() {
                    self.parse_type_decl(token.span.start, modifiers);
                } else {
                    self.parse_member_rest(token.span.start, modifiers);
                }
                PartialParse::Unit
            }
        }
    }

    /// One member of a type body.
    pub fn parse_member_unit(&mut self) -> PartialParse {
        let start = self.current().span.start;
        match self.current_kind() {
            TokenKind::Semi => {
                self.bump();
            }
            TokenKind::LBrace => {
                self.parse_body(NodeKind::MethodBody);
            }
            _ => {
                let modifiers = self.parse_modifiers();
                self.parse_member_rest(start, modifiers);
            }
        }
        PartialParse::Unit
    }

    /// The constant list that opens an enum body, up to and including its
    /// `;`. A list closed by the body's `}` leaves the `}` in place.
    pub fn parse_enum_constants_unit(&mut self) -> PartialParse {
        loop {
            self.parse_modifiers();
            match self.current_kind() {
                TokenKind::Semi => {
                    self.bump();
                    return PartialParse::Unit;
                }
                TokenKind::RBrace | TokenKind::Eof => return PartialParse::Unit,
                TokenKind::Ident => {
                    self.bump();
                    if self.at(TokenKind::LParen) && !self.skip_group() {
                        self.expected("`)`");
                    }
                    if self.at(TokenKind::LBrace) && !self.skip_group() {
                        return PartialParse::Unit;
                    }
                    match self.current_kind() {
                        TokenKind::Comma => {
                            self.bump();
                        }
                        TokenKind::Semi => {
                            self.bump();
                            return PartialParse::Unit;
                        }
                        TokenKind::RBrace | TokenKind::Eof => return PartialParse::Unit,
                        _ => {
                            self.expected("`,`, `;` or `}`");
                            self.finish_with_semi();
                            return PartialParse::Unit;
                        }
                    }
                }
                _ => {
                    let span = self.current().span;
                    self.finish_with_semi();
                    return PartialParse::Error {
                        span,
                        message: "expected an enum constant".to_string(),
                    };
                }
            }
        }
    }

    /// Modifiers and annotations in any order.
    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            let kind = self.current_kind();
            if let Some(flag) = Modifiers::from_token(kind) {
                // `default:` is a switch label, `default -> ` a case arm.
                if kind == TokenKind::Default
                    && matches!(self.nth_kind(1), TokenKind::Colon | TokenKind::Arrow)
                {
                    break;
                }
                self.bump();
                modifiers |= flag;
            } else if kind == TokenKind::At && self.nth_kind(1) != TokenKind::Interface {
                self.skip_annotation();
                modifiers |= Modifiers::ANNOTATED;
            } else if self.nth_is_word(0, "sealed") && self.starts_declaration_at(1) {
                self.bump();
                modifiers |= Modifiers::SEALED;
            } else if self.at_non_sealed() {
                self.bump();
                self.bump();
                self.bump();
                modifiers |= Modifiers::NON_SEALED;
            } else {
                break;
            }
        }
        modifiers
    }

    fn starts_declaration_at(&mut self, n: usize) -> bool {
        let kind = self.nth_kind(n);
        MODIFIERS.union(TYPE_KEYWORDS).contains(kind) || kind == TokenKind::At
    }

    /// `non-sealed`, lexed as `non`, `-`, `sealed` with nothing in between.
    fn at_non_sealed(&mut self) -> bool {
        if !self.nth_is_word(0, "non") || !self.nth_is_word(2, "sealed") {
            return false;
        }
        let non = self.cursor.nth(0);
        let minus = self.cursor.nth(1);
        let sealed = self.cursor.nth(2);
        minus.kind == TokenKind::Minus
            && non.span.end == minus.span.start
            && minus.span.end == sealed.span.start
    }

    /// `@Name`, `@a.b.Name` or `@Name(...)`.
    fn skip_annotation(&mut self) {
        self.bump();
        self.skip_qualified_name();
        if self.at(TokenKind::LParen) && !self.skip_group() {
            self.expected("`)`");
        }
    }

    fn skip_qualified_name(&mut self) -> bool {
        if !self.eat(TokenKind::Ident) {
            self.expected("a name");
            return false;
        }
        while self.at(TokenKind::Dot) && self.nth_kind(1) == TokenKind::Ident {
            self.bump();
            self.bump();
        }
        true
    }

    /// True at `class`, `interface`, `enum`, `@interface` or a `record`
    /// header.
    pub(crate) fn at_type_decl(&mut self) -> bool {
        match self.current_kind() {
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum => true,
            TokenKind::At => self.nth_kind(1) == TokenKind::Interface,
            TokenKind::Ident => {
                self.nth_is_word(0, "record")
                    && self.nth_kind(1) == TokenKind::Ident
                    && matches!(self.nth_kind(2), TokenKind::LParen | TokenKind::Lt)
            }
            _ => false,
        }
    }

    /// A type declaration whose modifiers (starting at absolute `start`)
    /// have been consumed.
    pub(crate) fn parse_type_decl(&mut self, start: u32, modifiers: Modifiers) {
        self.begin_node(NodeKind::TypeDecl, start);
        let body_kind = match self.current_kind() {
            TokenKind::At => {
                self.bump();
                self.bump();
                NodeKind::TypeBody
            }
            TokenKind::Enum => {
                self.bump();
                NodeKind::EnumBody
            }
            _ => {
                self.bump();
                NodeKind::TypeBody
            }
        };

        let name = if self.at(TokenKind::Ident) {
            let token = self.bump();
            Some(self.text(token).to_string())
        } else {
            self.expected("a type name");
            None
        };
        self.describe(name, modifiers);

        self.skip_balanced_until(TYPE_HEADER_STOP);
        let end = if self.at(TokenKind::LBrace) {
            self.parse_body(body_kind)
        } else {
            self.expected("`{`");
            self.eat(TokenKind::Semi);
            self.cursor.last_end()
        };
        self.end_node(end, false);
    }

    /// A member after its modifiers.
    pub(crate) fn parse_member_rest(&mut self, start: u32, modifiers: Modifiers) {
        if self.at(TokenKind::LBrace) {
            self.parse_body(NodeKind::MethodBody);
            return;
        }
        if self.at_type_decl() {
            self.parse_type_decl(start, modifiers);
            return;
        }
        if self.at(TokenKind::Lt) {
            self.skip_angles();
        }

        // Constructor, or compact constructor of a record.
        if self.at(TokenKind::Ident)
            && matches!(self.nth_kind(1), TokenKind::LParen | TokenKind::LBrace)
        {
            let token = self.bump();
            let name = self.text(token).to_string();
            self.parse_method(start, modifiers, Some(name));
            return;
        }

        if !self.parse_type() {
            self.expected("a member declaration");
            self.recover_member();
            return;
        }
        if !self.at(TokenKind::Ident) {
            self.expected("a name");
            self.recover_member();
            return;
        }
        let token = self.bump();
        if self.at(TokenKind::LParen) {
            let name = self.text(token).to_string();
            self.parse_method(start, modifiers, Some(name));
        } else {
            self.finish_with_semi();
        }
    }

    /// Method or constructor from its parameter list (or the body of a
    /// compact constructor) on.
    fn parse_method(&mut self, start: u32, modifiers: Modifiers, name: Option<String>) {
        self.begin_node(NodeKind::MethodDecl, start);
        self.describe(name, modifiers);
        if self.at(TokenKind::LParen) && !self.skip_group() {
            self.expected("`)`");
        }
        self.skip_balanced_until(METHOD_HEADER_STOP);
        let end = match self.current_kind() {
            TokenKind::LBrace => self.parse_body(NodeKind::MethodBody),
            TokenKind::Semi => self.bump().span.end,
            TokenKind::Default => {
                self.bump();
                self.finish_with_semi();
                self.cursor.last_end()
            }
            _ => {
                self.expected("`{` or `;`");
                self.cursor.last_end()
            }
        };
        self.end_node(end, false);
    }

    /// A type: primitive, `void` or a possibly generic qualified name,
    /// followed by array dimensions.
    pub(crate) fn parse_type(&mut self) -> bool {
        while self.at(TokenKind::At) && self.nth_kind(1) != TokenKind::Interface {
            self.skip_annotation();
        }
        let kind = self.current_kind();
        if kind.is_primitive_type() || kind == TokenKind::Void {
            self.bump();
        } else if kind == TokenKind::Ident {
            self.bump();
            if self.at(TokenKind::Lt) {
                self.skip_angles();
            }
            while self.at(TokenKind::Dot) && self.nth_kind(1) == TokenKind::Ident {
                self.bump();
                self.bump();
                if self.at(TokenKind::Lt) {
                    self.skip_angles();
                }
            }
        } else {
            return false;
        }
        while self.at(TokenKind::LBracket) && self.nth_kind(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
        }
        true
    }

    /// Skip to the end of the current statement-like item and consume its
    /// `;`.
    pub(crate) fn finish_with_semi(&mut self) {
        if self.skip_balanced_until(SEMI) {
            self.bump();
        } else {
            self.expected("`;`");
        }
    }

    fn recover_member(&mut self) {
        if recovery::synchronize(&mut self.cursor, recovery::MEMBER_BOUNDARY) {
            self.eat(TokenKind::Semi);
        }
    }
}
