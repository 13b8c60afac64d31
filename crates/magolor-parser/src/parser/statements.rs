//! Statement parsing: let, return, control flow, match, blocks, and raw
//! C++ escape hatches.

use magolor_common::diagnostics::codes;
use magolor_common::token::TokenKind;

use crate::ast::{MatchArm, Pattern, Stmt, StmtKind};
use crate::parser::Parser;

impl Parser<'_> {
    /// `"{" stmt* "}"`
    pub(crate) fn parse_block(&mut self) -> Vec<Stmt> {
        self.expect(TokenKind::LBrace, "expected `{`");
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            stmts.push(self.parse_stmt());
        }
        self.expect(TokenKind::RBrace, "expected `}`");
        stmts
    }

    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        match self.current().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::RawBlock => {
                let token = self.bump();
                Stmt::new(StmtKind::Raw(token.text), token.span)
            }
            TokenKind::LBrace => {
                let start = self.span().start;
                let stmts = self.parse_block();
                Stmt::new(StmtKind::Block(stmts), self.span_from(start))
            }
            _ => {
                let start = self.span().start;
                let expr = self.parse_expr();
                self.eat(TokenKind::Semicolon);
                Stmt::new(StmtKind::Expr(expr), self.span_from(start))
            }
        }
    }

    /// `let ("mut")? ident (":" type)? "=" expr ";"`
    fn parse_let(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::Let, "expected `let`");
        let mutable = self.eat(TokenKind::Mut);
        let name = self.expect(TokenKind::Ident, "expected variable name");
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        self.expect(TokenKind::Eq, "expected `=` in let statement");
        let init = self.parse_expr();
        self.expect(TokenKind::Semicolon, "expected `;` after let statement");
        Stmt::new(
            StmtKind::Let {
                name: name.text,
                name_span: name.span,
                ty,
                init,
                mutable,
            },
            self.span_from(start),
        )
    }

    /// `return expr? ";"`
    fn parse_return(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::Return, "expected `return`");
        let value = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TokenKind::Semicolon, "expected `;` after return statement");
        Stmt::new(StmtKind::Return(value), self.span_from(start))
    }

    /// `if "(" expr ")" block ("else" (if | block))?`
    ///
    /// `else if` recurses into this rule, so chains nest without a
    /// dangling-else ambiguity (braces are mandatory).
    fn parse_if(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::If, "expected `if`");
        self.expect(TokenKind::LParen, "expected `(` after `if`");
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen, "expected `)` after if condition");
        let then_body = self.parse_block();
        let mut else_body = Vec::new();
        if self.eat(TokenKind::Else) {
            if self.at(TokenKind::If) {
                else_body.push(self.parse_if());
            } else {
                else_body = self.parse_block();
            }
        }
        Stmt::new(
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
            self.span_from(start),
        )
    }

    /// `while "(" expr ")" block`
    fn parse_while(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::While, "expected `while`");
        self.expect(TokenKind::LParen, "expected `(` after `while`");
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen, "expected `)` after while condition");
        let body = self.parse_block();
        Stmt::new(StmtKind::While { cond, body }, self.span_from(start))
    }

    /// `for "(" ident "in" expr ")" block`
    fn parse_for(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::For, "expected `for`");
        self.expect(TokenKind::LParen, "expected `(` after `for`");
        let var = self.expect(TokenKind::Ident, "expected loop variable name");
        let in_tok = self.expect(TokenKind::Ident, "expected `in`");
        if in_tok.text != "in" && !in_tok.text.is_empty() {
            self.sink.error_with_hint(
                codes::PARSE_UNEXPECTED_TOKEN,
                in_tok.span,
                "expected `in` keyword",
                "use `for (x in array)` syntax",
            );
        }
        let iterable = self.parse_expr();
        self.expect(TokenKind::RParen, "expected `)` after for header");
        let body = self.parse_block();
        Stmt::new(
            StmtKind::For {
                var: var.text,
                var_span: var.span,
                iterable,
                body,
            },
            self.span_from(start),
        )
    }

    /// `match expr "{" arm* "}"` where an arm is
    /// `pattern ("(" ident ")")? "=>" (block | "return" expr? | stmt) ","?`
    fn parse_match(&mut self) -> Stmt {
        let start = self.span().start;
        self.expect(TokenKind::Match, "expected `match`");
        let scrutinee = self.parse_expr();
        self.expect(TokenKind::LBrace, "expected `{` after match expression");

        let mut arms = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let pattern_span = self.span();
            let pattern = match self.current().kind {
                TokenKind::SomeKw => {
                    self.bump();
                    Pattern::Some
                }
                TokenKind::NoneKw => {
                    self.bump();
                    Pattern::None
                }
                _ => {
                    let tok = self.expect(TokenKind::Ident, "expected pattern");
                    if tok.text.is_empty() {
                        // Could not even read a pattern name; resynchronize
                        // so a stray token cannot stall the arm loop.
                        self.synchronize();
                        continue;
                    }
                    Pattern::Name(tok.text)
                }
            };

            let mut binder = None;
            if self.eat(TokenKind::LParen) {
                let bind = self.expect(TokenKind::Ident, "expected binding variable");
                if !bind.text.is_empty() {
                    binder = Some(bind.text);
                }
                self.expect(TokenKind::RParen, "expected `)` after binding");
            }

            self.expect(TokenKind::FatArrow, "expected `=>` in match arm");

            let body = if self.at(TokenKind::LBrace) {
                self.parse_block()
            } else if self.at(TokenKind::Return) {
                // `Some(x) => return x;` -- a bare return arm.
                let ret_start = self.span().start;
                self.bump();
                let value = if self.at(TokenKind::Comma)
                    || self.at(TokenKind::RBrace)
                    || self.at(TokenKind::Semicolon)
                {
                    None
                } else {
                    Some(self.parse_expr())
                };
                self.eat(TokenKind::Semicolon);
                vec![Stmt::new(StmtKind::Return(value), self.span_from(ret_start))]
            } else {
                vec![self.parse_stmt()]
            };
            self.eat(TokenKind::Comma);

            arms.push(MatchArm {
                pattern,
                pattern_span,
                binder,
                body,
            });
        }
        self.expect(TokenKind::RBrace, "expected `}` at end of match");
        Stmt::new(StmtKind::Match { scrutinee, arms }, self.span_from(start))
    }
}
