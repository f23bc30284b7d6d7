//! Statements.
//!
//! Only the statement structure is followed: conditions, resources and
//! expressions are skipped as balanced token runs. Blocks nested inside a
//! statement are parsed statement by statement so that local type
//! declarations still become nodes.

use jade_ir::TokenKind;
use jade_stack::ensure_sufficient_stack;

use super::EditorParser;
use crate::kinds::PartialParse;
use crate::recovery::TokenSet;

/// End of a `case` label.
const CASE_LABEL_END: TokenSet = TokenSet::new()
    .with(TokenKind::Colon)
    .with(TokenKind::Arrow);

impl EditorParser<'_, '_> {
    /// One statement of a method body.
    pub fn parse_statement_unit(&mut self) -> PartialParse {
        self.parse_statement();
        PartialParse::Unit
    }

    pub(crate) fn parse_statement(&mut self) {
        ensure_sufficient_stack(|| self.parse_statement_at_token());
    }

    fn parse_statement_at_token(&mut self) {
        let token = self.current();
        match token.kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Semi => {
                self.bump();
            }
            TokenKind::If => {
                self.bump();
                self.parse_condition();
                self.parse_statement();
                if self.eat(TokenKind::Else) {
                    self.parse_statement();
                }
            }
            TokenKind::While | TokenKind::For => {
                self.bump();
                self.parse_condition();
                self.parse_statement();
            }
            TokenKind::Do => {
                self.bump();
                self.parse_statement();
                if self.eat(TokenKind::While) {
                    self.parse_condition();
                    self.finish_with_semi();
                } else {
                    self.expected("`while`");
                }
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Switch => {
                self.bump();
                self.parse_condition();
                self.parse_switch_block();
            }
            TokenKind::Synchronized if self.nth_kind(1) == TokenKind::LParen => {
                self.bump();
                self.parse_condition();
                self.expect_block();
            }
            TokenKind::Return
            | TokenKind::Throw
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Assert => {
                self.bump();
                self.finish_with_semi();
            }
            TokenKind::Case | TokenKind::Default => {
                self.bump();
                self.error_at(token.span, "case label outside of a switch");
                self.parse_case_label_tail();
            }
            TokenKind::Else => {
                self.unexpected();
            }
            TokenKind::Ident if self.nth_kind(1) == TokenKind::Colon => {
                self.bump();
                self.bump();
                self.parse_statement();
            }
            _ => {
                let modifiers = self.parse_modifiers();
                if self.at_type_decl() {
                    self.parse_type_decl(token.span.start, modifiers);
                } else {
                    self.finish_with_semi();
                }
            }
        }
    }

    /// `{ statements }` without a node of its own.
    pub(crate) fn parse_block(&mut self) {
        self.bump();
        self.parse_statements_until_close();
    }

    /// Statements up to and including the closing `}`.
    fn parse_statements_until_close(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::RBrace => {
                    self.bump();
                    return;
                }
                TokenKind::Eof => return,
                _ => {
                    let consumed = self.cursor.consumed();
                    self.parse_statement();
                    if self.cursor.consumed() == consumed {
                        self.unexpected();
                    }
                }
            }
        }
    }

    fn expect_block(&mut self) {
        if self.at(TokenKind::LBrace) {
            self.parse_block();
        } else {
            self.expected("`{`");
        }
    }

    /// A parenthesized condition, header or selector.
    fn parse_condition(&mut self) {
        if !self.at(TokenKind::LParen) {
            self.expected("`(`");
        } else if !self.skip_group() {
            self.expected("`)`");
        }
    }

    fn parse_try(&mut self) {
        self.bump();
        let resources = self.at(TokenKind::LParen);
        if resources && !self.skip_group() {
            self.expected("`)`");
        }
        self.expect_block();
        let mut handled = false;
        while self.eat(TokenKind::Catch) {
            handled = true;
            self.parse_condition();
            self.expect_block();
        }
        if self.eat(TokenKind::Finally) {
            handled = true;
            self.expect_block();
        }
        if !handled && !resources {
            self.expected("`catch` or `finally`");
        }
    }

    fn parse_switch_block(&mut self) {
        if !self.at(TokenKind::LBrace) {
            self.expected("`{`");
            return;
        }
        self.bump();
        loop {
            match self.current_kind() {
                TokenKind::RBrace => {
                    self.bump();
                    return;
                }
                TokenKind::Eof => return,
                TokenKind::Case | TokenKind::Default => {
                    self.bump();
                    self.parse_case_label_tail();
                }
                _ => {
                    let consumed = self.cursor.consumed();
                    self.parse_statement();
                    if self.cursor.consumed() == consumed {
                        self.unexpected();
                    }
                }
            }
        }
    }

    /// The rest of a `case` or `default` label: patterns up to `:` or `->`,
    /// and for an arrow its single body.
    fn parse_case_label_tail(&mut self) {
        if !self.skip_balanced_until(CASE_LABEL_END) {
            self.expected("`:` or `->`");
            return;
        }
        if self.bump().kind == TokenKind::Arrow {
            self.parse_statement();
        }
    }
}
