//! Integration tests for the Magolor lexer.

use magolor_common::diagnostics::DiagnosticSink;
use magolor_common::token::TokenKind;
use magolor_lexer::tokenize;

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut sink = DiagnosticSink::new("test.mg");
    tokenize(source, &mut sink).into_iter().map(|t| t.kind).collect()
}

#[test]
fn empty_source_yields_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn keywords_and_idents() {
    assert_eq!(
        kinds("fn main foo"),
        vec![TokenKind::Fn, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
    );
    assert_eq!(
        kinds("let mut x"),
        vec![TokenKind::Let, TokenKind::Mut, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn primitive_type_keywords() {
    assert_eq!(
        kinds("int float string bool void"),
        vec![
            TokenKind::IntTy,
            TokenKind::FloatTy,
            TokenKind::StringTy,
            TokenKind::BoolTy,
            TokenKind::VoidTy,
            TokenKind::Eof
        ]
    );
}

#[test]
fn greedy_operator_matching() {
    assert_eq!(
        kinds("- -> = == => ! != < <= > >= : :: && ||"),
        vec![
            TokenKind::Minus,
            TokenKind::Arrow,
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::FatArrow,
            TokenKind::Bang,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::LtEq,
            TokenKind::Gt,
            TokenKind::GtEq,
            TokenKind::Colon,
            TokenKind::ColonColon,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::Eof
        ]
    );
}

#[test]
fn number_literals() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("42 3.14 7.", &mut sink);
    assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
    assert_eq!(tokens[0].text, "42");
    assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
    assert_eq!(tokens[1].text, "3.14");
    // A dot not followed by a digit stays out of the number.
    assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
    assert_eq!(tokens[2].text, "7");
    assert_eq!(tokens[3].kind, TokenKind::Dot);
}

#[test]
fn string_escape_processing() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize(r#""a\nb\t\\\"c""#, &mut sink);
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].text, "a\nb\t\\\"c");
    assert!(!sink.has_error());
}

#[test]
fn unterminated_string_reports_at_opening_quote() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("let s = \"oops", &mut sink);
    assert!(sink.has_error());
    let diag = &sink.diagnostics()[0];
    assert_eq!(diag.span.start, 8);
    assert_eq!(diag.span.end, 9);
    assert!(diag.message.contains("unterminated"));
    // A synthetic error token is emitted and lexing reaches Eof.
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}

#[test]
fn interpolated_string_token() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("$\"Hello, {name}!\"", &mut sink);
    assert_eq!(tokens[0].kind, TokenKind::InterpolatedString);
    assert_eq!(tokens[0].text, "Hello, {name}!");
    // Span covers `$` through the closing quote.
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 17);
}

#[test]
fn dollar_without_string_is_error() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("$x", &mut sink);
    assert!(sink.has_error());
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(tokens[1].kind, TokenKind::Ident);
}

#[test]
fn raw_block_captures_balanced_braces() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("@cpp { if (x) { y(); } }", &mut sink);
    assert_eq!(tokens[0].kind, TokenKind::RawBlock);
    assert_eq!(tokens[0].text, " if (x) { y(); } ");
    assert!(!sink.has_error());
}

#[test]
fn raw_block_ignores_braces_in_strings() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("@cpp { printf(\"}\"); }", &mut sink);
    assert_eq!(tokens[0].kind, TokenKind::RawBlock);
    assert!(tokens[0].text.contains("printf"));
    assert!(!sink.has_error());
}

#[test]
fn unterminated_raw_block_is_error() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("@cpp { int x = 1;", &mut sink);
    assert!(sink.has_error());
    assert_eq!(tokens[0].kind, TokenKind::Error);
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("// a comment\nfn // trailing\nmain"),
        vec![TokenKind::Fn, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn unknown_character_recovers() {
    let mut sink = DiagnosticSink::new("test.mg");
    let tokens = tokenize("let # x", &mut sink);
    assert!(sink.has_error());
    assert_eq!(tokens[0].kind, TokenKind::Let);
    assert_eq!(tokens[1].kind, TokenKind::Error);
    assert_eq!(tokens[2].kind, TokenKind::Ident);
}

#[test]
fn spans_round_trip_to_lexemes() {
    // For tokens whose text is not escape-processed, slicing the source by
    // the token span must reproduce the lexeme exactly.
    let source = "fn add(a: int, b: int) -> int { return a + b; }";
    let mut sink = DiagnosticSink::new("test.mg");
    for token in tokenize(source, &mut sink) {
        if token.kind == TokenKind::Eof {
            continue;
        }
        let slice = &source[token.span.start as usize..token.span.end as usize];
        assert_eq!(slice, token.text, "span mismatch for {:?}", token.kind);
    }
    assert!(!sink.has_error());
}

#[test]
fn option_constructors_lex_as_keywords() {
    assert_eq!(
        kinds("Some(None)"),
        vec![
            TokenKind::SomeKw,
            TokenKind::LParen,
            TokenKind::NoneKw,
            TokenKind::RParen,
            TokenKind::Eof
        ]
    );
}
