use jade_ir::{Span, TokenKind, TokenSource};
use pretty_assertions::assert_eq;

use super::{lex, Lexer};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

// === Declarations ===

#[test]
fn lexes_method_declaration() {
    use TokenKind::*;
    assert_eq!(
        kinds("public void foo(int x) { return; }"),
        vec![Public, Void, Ident, LParen, Int, Ident, RParen, LBrace, Return, Semi, RBrace]
    );
}

#[test]
fn generics_close_with_single_angles() {
    use TokenKind::*;
    assert_eq!(
        kinds("List<List<String>> l;"),
        vec![Ident, Lt, Ident, Lt, Ident, Gt, Gt, Ident, Semi]
    );
}

#[test]
fn compound_punctuation() {
    use TokenKind::*;
    assert_eq!(
        kinds("x -> a::b(c...)"),
        vec![Ident, Arrow, Ident, ColonColon, Ident, LParen, Ident, Ellipsis, RParen]
    );
}

#[test]
fn contextual_keywords_are_identifiers() {
    assert_eq!(kinds("record var yield"), vec![TokenKind::Ident; 3]);
}

#[test]
fn unicode_identifiers() {
    let tokens = lex("int café = 1;");
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].span, Span::new(4, 9));
}

// === Literals ===

#[test]
fn numeric_literals() {
    use TokenKind::*;
    assert_eq!(
        kinds("0 42 0xFF 0b1010 1_000L 1.5 .5 1e10 2f 3.0d 0x1.8p1"),
        vec![IntLit, IntLit, IntLit, IntLit, IntLit, FloatLit, FloatLit, FloatLit, FloatLit, FloatLit, FloatLit]
    );
}

#[test]
fn string_with_escapes() {
    let tokens = lex(r#"s = "a\"b";"#);
    assert_eq!(tokens[2].kind, TokenKind::StringLit);
    assert_eq!(tokens[2].span, Span::new(4, 10));
}

#[test]
fn unterminated_string_stops_at_line_break() {
    use TokenKind::*;
    assert_eq!(kinds("\"abc\nx;"), vec![UnterminatedString, Ident, Semi]);
}

#[test]
fn text_block() {
    let source = "s = \"\"\"\n  hello \"quoted\"\n  \"\"\";";
    let tokens = lex(source);
    assert_eq!(tokens[2].kind, TokenKind::TextBlock);
    assert_eq!(tokens[3].kind, TokenKind::Semi);
}

#[test]
fn char_literals() {
    use TokenKind::*;
    assert_eq!(kinds(r"'a' '\n' '\''"), vec![CharLit, CharLit, CharLit]);
    assert_eq!(kinds("'a\n"), vec![UnterminatedChar]);
}

// === Comments ===

#[test]
fn comment_kinds() {
    use TokenKind::*;
    assert_eq!(
        kinds("// line\n/* block */ /** doc */ /**/"),
        vec![LineComment, BlockComment, DocComment, BlockComment]
    );
}

#[test]
fn line_comment_excludes_newline() {
    let tokens = lex("// hi\nx");
    assert_eq!(tokens[0].span, Span::new(0, 5));
    assert_eq!(tokens[1].span, Span::new(6, 7));
}

#[test]
fn unterminated_block_comment_runs_to_end() {
    let tokens = lex("x /* never closed");
    assert_eq!(tokens[1].kind, TokenKind::UnterminatedComment);
    assert_eq!(tokens[1].span, Span::new(2, 17));
}

// === Malformed input ===

#[test]
fn stray_characters_are_unknown() {
    use TokenKind::*;
    assert_eq!(kinds("a # b"), vec![Ident, Unknown, Ident]);
    assert_eq!(kinds("€"), vec![Unknown]);
}

// === Bounds & resumption ===

#[test]
fn bounded_lexer_ends_at_limit() {
    let source = "{ a; } b;";
    let mut lexer = Lexer::bounded(source, 1, 5);
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
    assert_eq!(lexer.next_token().kind, TokenKind::Semi);
    let eof = lexer.next_token();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span, Span::point(5));
    // Eof is sticky.
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn comment_crossing_limit_is_unterminated() {
    let source = "/* a */";
    let mut lexer = Lexer::bounded(source, 0, 5);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::UnterminatedComment);
    assert_eq!(token.span, Span::new(0, 5));
}

#[test]
fn resumes_mid_document() {
    let source = "int a; int b;";
    let mut lexer = Lexer::bounded(source, 7, 13);
    assert_eq!(lexer.next_token().span, Span::new(7, 10));
    assert_eq!(lexer.position(), 10);
}
