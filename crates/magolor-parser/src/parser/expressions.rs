//! Expression parsing with precedence climbing.

use magolor_common::diagnostics::codes;
use magolor_common::token::TokenKind;

use crate::ast::{BinOp, Expr, ExprKind, UnOp};
use crate::parser::Parser;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Expr {
        let mut lhs = self.parse_and();
        while self.at(TokenKind::PipePipe) {
            self.bump();
            let rhs = self.parse_and();
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        lhs
    }

    fn parse_and(&mut self) -> Expr {
        let mut lhs = self.parse_equality();
        while self.at(TokenKind::AmpAmp) {
            self.bump();
            let rhs = self.parse_equality();
            lhs = binary(BinOp::And, lhs, rhs);
        }
        lhs
    }

    fn parse_equality(&mut self) -> Expr {
        let mut lhs = self.parse_comparison();
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_comparison();
            lhs = binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_comparison(&mut self) -> Expr {
        let mut lhs = self.parse_term();
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::LtEq => BinOp::Le,
                TokenKind::GtEq => BinOp::Ge,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_term();
            lhs = binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_term(&mut self) -> Expr {
        let mut lhs = self.parse_factor();
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_factor();
            lhs = binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_factor(&mut self) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary();
            lhs = binary(op, lhs, rhs);
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.current().kind {
            TokenKind::Bang => UnOp::Not,
            TokenKind::Minus => UnOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.span().start;
        self.bump();
        let operand = self.parse_unary();
        let span = self.span_from(start);
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// Postfix chain: `call(args)`, `.name`, `[index]`, `::name`.
    fn parse_postfix(&mut self) -> Expr {
        let start = self.span().start;
        let mut expr = self.parse_primary();
        loop {
            match self.current().kind {
                TokenKind::LParen => {
                    self.bump();
                    let args = self.parse_args();
                    self.expect(TokenKind::RParen, "expected `)` after arguments");
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::Dot | TokenKind::ColonColon => {
                    self.bump();
                    let name = self.expect(TokenKind::Ident, "expected member name");
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            name: name.text,
                            name_span: name.span,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr();
                    self.expect(TokenKind::RBracket, "expected `]` after index");
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }
        expr
    }

    /// Comma-separated argument list; the caller owns the parentheses.
    fn parse_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.at(TokenKind::RParen) {
            return args;
        }
        loop {
            args.push(self.parse_expr());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.span().start;
        match self.current().kind {
            TokenKind::IntLiteral => {
                let token = self.bump();
                let value = match token.text.parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => {
                        self.sink.error(
                            codes::PARSE_INT_OUT_OF_RANGE,
                            token.span,
                            format!("integer literal `{}` out of range", token.text),
                        );
                        0
                    }
                };
                Expr::new(ExprKind::Int(value), token.span)
            }
            TokenKind::FloatLiteral => {
                let token = self.bump();
                let value = token.text.parse::<f64>().unwrap_or(0.0);
                Expr::new(ExprKind::Float(value), token.span)
            }
            TokenKind::StringLiteral => {
                let token = self.bump();
                Expr::new(
                    ExprKind::Str {
                        value: token.text,
                        interpolated: false,
                    },
                    token.span,
                )
            }
            TokenKind::InterpolatedString => {
                let token = self.bump();
                Expr::new(
                    ExprKind::Str {
                        value: token.text,
                        interpolated: true,
                    },
                    token.span,
                )
            }
            TokenKind::True => {
                let token = self.bump();
                Expr::new(ExprKind::Bool(true), token.span)
            }
            TokenKind::False => {
                let token = self.bump();
                Expr::new(ExprKind::Bool(false), token.span)
            }
            TokenKind::NoneKw => {
                let token = self.bump();
                Expr::new(ExprKind::None, token.span)
            }
            TokenKind::SomeKw => {
                self.bump();
                self.expect(TokenKind::LParen, "expected `(` after `Some`");
                let value = self.parse_expr();
                self.expect(TokenKind::RParen, "expected `)` after Some value");
                Expr::new(ExprKind::Some(Box::new(value)), self.span_from(start))
            }
            TokenKind::This => {
                let token = self.bump();
                Expr::new(ExprKind::This, token.span)
            }
            TokenKind::New => {
                self.bump();
                let class = self.expect(TokenKind::Ident, "expected class name after `new`");
                self.expect(TokenKind::LParen, "expected `(` after class name");
                let args = self.parse_args();
                self.expect(TokenKind::RParen, "expected `)` after constructor arguments");
                Expr::new(
                    ExprKind::New {
                        class: class.text,
                        args,
                    },
                    self.span_from(start),
                )
            }
            TokenKind::Fn => self.parse_lambda(),
            TokenKind::Ident => {
                let token = self.bump();
                Expr::new(ExprKind::Ident(token.text), token.span)
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.parse_expr();
                self.expect(TokenKind::RParen, "expected `)` after expression");
                expr
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elements = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "expected `]` after array elements");
                Expr::new(ExprKind::Array(elements), self.span_from(start))
            }
            _ => {
                // Record, skip the offending token, and synthesize a zero so
                // parsing can continue past the damage.
                let token = self.bump();
                self.sink.error_with_hint(
                    codes::PARSE_EXPECTED_EXPR,
                    token.span,
                    format!("unexpected token `{}` in expression", token.text),
                    "expected a literal, identifier, or `(`",
                );
                Expr::new(ExprKind::Int(0), token.span)
            }
        }
    }

    /// `fn "(" params? ")" ("->" type)? block` in expression position.
    fn parse_lambda(&mut self) -> Expr {
        let start = self.span().start;
        self.expect(TokenKind::Fn, "expected `fn`");
        self.expect(TokenKind::LParen, "expected `(` after `fn`");
        let params = self.parse_params();
        self.expect(TokenKind::RParen, "expected `)` after parameters");
        let ret = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = self.parse_block();
        Expr::new(
            ExprKind::Lambda { params, ret, body },
            self.span_from(start),
        )
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span.merge(rhs.span);
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}
