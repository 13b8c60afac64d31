// Magolor lexer -- tokenizer for the Magolor programming language.

mod cursor;

use cursor::Cursor;
use magolor_common::diagnostics::{codes, DiagnosticSink};
use magolor_common::span::Span;
use magolor_common::token::{keyword_from_str, Token, TokenKind};

/// The Magolor lexer. Converts source text into a stream of tokens.
///
/// Wraps a [`Cursor`] for byte-level iteration. Lex errors are recorded in
/// the [`DiagnosticSink`] and a synthetic `Error` token is emitted in place
/// of the offending input, so lexing always reaches end of file and later
/// errors still surface.
pub struct Lexer<'src, 'sink> {
    cursor: Cursor<'src>,
    sink: &'sink mut DiagnosticSink,
}

/// Tokenize the entire source into a `Vec<Token>`.
///
/// The returned vector always ends with an `Eof` token.
pub fn tokenize(source: &str, sink: &mut DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        cursor: Cursor::new(source),
        sink,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

impl<'src, 'sink> Lexer<'src, 'sink> {
    /// Produce the next token, skipping whitespace and comments first.
    fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, "", start, start);
        };

        match c {
            // ── Single-character delimiters ─────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '*' => self.single_char_token(TokenKind::Star, start),
            '/' => self.single_char_token(TokenKind::Slash, start),
            '%' => self.single_char_token(TokenKind::Percent, start),

            // ── Multi-character operators (greedy longest-match) ────────
            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '-' => self.lex_minus(start),
            ':' => self.lex_colon(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_pipe(start),

            // ── Literals ────────────────────────────────────────────────
            '"' => self.lex_string(start, false),
            '$' => self.lex_dollar(start),
            '@' => self.lex_raw_block(start),
            '0'..='9' => self.lex_number(start),

            // ── Identifiers and keywords ────────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character (error recovery) ──────────────────────
            _ => {
                self.cursor.advance();
                let end = self.cursor.pos();
                self.sink.error(
                    codes::LEX_UNEXPECTED_CHAR,
                    Span::new(start, end),
                    format!("unexpected character `{c}`"),
                );
                Token::new(TokenKind::Error, c.to_string(), start, end)
            }
        }
    }

    /// Skip whitespace (including newlines) and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor
                .eat_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        let end = self.cursor.pos();
        Token::new(kind, self.cursor.slice(start, end), start, end)
    }

    fn token_from(&self, kind: TokenKind, start: u32) -> Token {
        let end = self.cursor.pos();
        Token::new(kind, self.cursor.slice(start, end), start, end)
    }

    // ── Operator lexing ────────────────────────────────────────────────

    /// `=` -> `Eq`, `==` -> `EqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.token_from(TokenKind::EqEq, start)
            }
            Some('>') => {
                self.cursor.advance();
                self.token_from(TokenKind::FatArrow, start)
            }
            _ => self.token_from(TokenKind::Eq, start),
        }
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.token_from(TokenKind::NotEq, start)
        } else {
            self.token_from(TokenKind::Bang, start)
        }
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.token_from(TokenKind::LtEq, start)
        } else {
            self.token_from(TokenKind::Lt, start)
        }
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.token_from(TokenKind::GtEq, start)
        } else {
            self.token_from(TokenKind::Gt, start)
        }
    }

    /// `-` -> `Minus`, `->` -> `Arrow`
    fn lex_minus(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            self.token_from(TokenKind::Arrow, start)
        } else {
            self.token_from(TokenKind::Minus, start)
        }
    }

    /// `:` -> `Colon`, `::` -> `ColonColon`
    fn lex_colon(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(':') {
            self.cursor.advance();
            self.token_from(TokenKind::ColonColon, start)
        } else {
            self.token_from(TokenKind::Colon, start)
        }
    }

    /// `&&` -> `AmpAmp`; a lone `&` is an error.
    fn lex_amp(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('&') {
            self.cursor.advance();
            self.token_from(TokenKind::AmpAmp, start)
        } else {
            let end = self.cursor.pos();
            self.sink.error(
                codes::LEX_UNEXPECTED_CHAR,
                Span::new(start, end),
                "unexpected character `&` (did you mean `&&`?)",
            );
            Token::new(TokenKind::Error, "&", start, end)
        }
    }

    /// `||` -> `PipePipe`; a lone `|` is an error.
    fn lex_pipe(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('|') {
            self.cursor.advance();
            self.token_from(TokenKind::PipePipe, start)
        } else {
            let end = self.cursor.pos();
            self.sink.error(
                codes::LEX_UNEXPECTED_CHAR,
                Span::new(start, end),
                "unexpected character `|` (did you mean `||`?)",
            );
            Token::new(TokenKind::Error, "|", start, end)
        }
    }

    // ── Literal lexing ─────────────────────────────────────────────────

    /// Integer or float literal. A `.` followed by a digit promotes to float.
    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.token_from(kind, start)
    }

    /// String literal with `\n \t \\ \"` escape processing.
    ///
    /// An unterminated string reports at the opening quote and yields a
    /// synthetic `Error` token.
    fn lex_string(&mut self, start: u32, interpolated: bool) -> Token {
        let quote_pos = self.cursor.pos();
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    self.sink.error(
                        codes::LEX_UNTERMINATED_STRING,
                        Span::new(quote_pos, quote_pos + 1),
                        "unterminated string literal",
                    );
                    let end = self.cursor.pos();
                    return Token::new(TokenKind::Error, value, start, end);
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(other) => value.push(other),
                        None => {}
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        let end = self.cursor.pos();
        let kind = if interpolated {
            TokenKind::InterpolatedString
        } else {
            TokenKind::StringLiteral
        };
        Token::new(kind, value, start, end)
    }

    /// `$` immediately followed by a string literal fuses into a single
    /// interpolated-string token; anything else after `$` is an error.
    fn lex_dollar(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '$'
        if self.cursor.peek() == Some('"') {
            self.lex_string(start, true)
        } else {
            let end = self.cursor.pos();
            self.sink.error(
                codes::LEX_UNEXPECTED_CHAR,
                Span::new(start, end),
                "expected string literal after `$`",
            );
            Token::new(TokenKind::Error, "$", start, end)
        }
    }

    /// `@cpp { ... }` -- captures balanced braces as one opaque token whose
    /// text is the enclosed code. Braces inside string literals are ignored
    /// when balancing.
    fn lex_raw_block(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '@'
        let tag_start = self.cursor.pos();
        self.cursor.eat_while(is_ident_continue);
        let tag = self.cursor.slice(tag_start, self.cursor.pos()).to_string();
        self.cursor.eat_while(|c| c == ' ' || c == '\t');

        if tag != "cpp" || self.cursor.peek() != Some('{') {
            let end = self.cursor.pos();
            self.sink.error(
                codes::LEX_UNEXPECTED_CHAR,
                Span::new(start, end.max(start + 1)),
                "expected `@cpp { ... }` raw block",
            );
            return Token::new(TokenKind::Error, "@", start, end.max(start + 1));
        }

        self.cursor.advance(); // consume '{'
        let body_start = self.cursor.pos();
        let mut depth = 1u32;
        let mut in_string = false;
        loop {
            match self.cursor.peek() {
                None => {
                    self.sink.error(
                        codes::LEX_UNTERMINATED_RAW_BLOCK,
                        Span::new(start, start + 1),
                        "unterminated raw block",
                    );
                    let body = self.cursor.slice(body_start, self.cursor.pos()).to_string();
                    return Token::new(TokenKind::Error, body, start, self.cursor.pos());
                }
                Some('"') if !in_string => {
                    in_string = true;
                    self.cursor.advance();
                }
                Some('"') if in_string => {
                    in_string = false;
                    self.cursor.advance();
                }
                Some('\\') if in_string => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('{') if !in_string => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some('}') if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        let body = self.cursor.slice(body_start, self.cursor.pos()).to_string();
                        self.cursor.advance(); // consume closing '}'
                        return Token::new(TokenKind::RawBlock, body, start, self.cursor.pos());
                    }
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Identifier or keyword.
    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        self.token_from(kind, start)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
