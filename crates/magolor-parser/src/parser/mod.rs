//! Recursive-descent parser for Magolor.
//!
//! The parser consumes the full token stream and produces a best-effort
//! [`Program`]: on a mismatched token it records a diagnostic, synthesizes
//! the missing piece, and keeps going. It never panics and never unwinds,
//! so the checker and the language server always have an AST to work with.
//!
//! Expressions use precedence climbing with one method per binding level,
//! weakest to strongest: `||`, `&&`, equality, comparison, additive,
//! multiplicative, unary, postfix chain, primary.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod statements;

use magolor_common::diagnostics::{codes, DiagnosticSink};
use magolor_common::span::Span;
use magolor_common::token::{Token, TokenKind};

use crate::ast::Program;

/// Parse a token stream into a [`Program`], reporting into `sink`.
pub fn parse(tokens: Vec<Token>, sink: &mut DiagnosticSink) -> Program {
    let mut parser = Parser::new(tokens, sink);
    parser.parse_program()
}

pub(crate) struct Parser<'sink> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) sink: &'sink mut DiagnosticSink,
}

impl<'sink> Parser<'sink> {
    fn new(tokens: Vec<Token>, sink: &'sink mut DiagnosticSink) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token stream must end with Eof"
        );
        Self { tokens, pos: 0, sink }
    }

    // ── Token access ───────────────────────────────────────────────────

    /// The current token. Clamped to the trailing `Eof`.
    pub(crate) fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens.last().expect("token stream is never empty")
        })
    }

    /// Kind of the current token.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Span of the current token.
    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// End offset of the last consumed token (start of file before any).
    pub(crate) fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    /// Span from a recorded start offset to the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Consume and return the current token. Never advances past `Eof`.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Expect a token of `kind`.
    ///
    /// On mismatch, records a parse error at the offending token and returns
    /// a zero-length synthetic token there without consuming anything, so
    /// the caller can continue with its best guess.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> Token {
        if self.at(kind) {
            return self.bump();
        }
        let found = self.current().clone();
        let what = if found.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", found.text)
        };
        self.sink.error(
            codes::PARSE_UNEXPECTED_TOKEN,
            found.span,
            format!("{message}, found {what}"),
        );
        Token::new(TokenKind::Error, "", found.span.start, found.span.start)
    }

    /// Skip ahead to the next statement boundary after severe
    /// desynchronization: consumes up to and including the next `;`, or
    /// stops in front of a closing brace or end of file.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.bump();
                }
            }
        }
    }
}
