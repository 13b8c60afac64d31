//! Top-level declarations: using/cimport directives, classes, functions,
//! and type syntax.

use magolor_common::diagnostics::codes;
use magolor_common::token::TokenKind;

use crate::ast::{
    CImportDecl, ClassDecl, Field, FnDecl, Param, Program, Type, UsingDecl,
};
use crate::parser::Parser;

impl Parser<'_> {
    /// `program := (using | cimport | class | function)*`
    ///
    /// Top-level declarations may carry an optional `pub`/`priv` prefix.
    /// Functions and classes default to public at the top level.
    pub(crate) fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.at(TokenKind::Eof) {
            match self.current().kind {
                TokenKind::Using => program.usings.push(self.parse_using()),
                TokenKind::CImport => program.cimports.push(self.parse_cimport()),
                TokenKind::Class => program.classes.push(self.parse_class(true)),
                TokenKind::Fn => program.functions.push(self.parse_function(true)),
                TokenKind::Pub | TokenKind::Priv => {
                    let is_public = self.bump().kind == TokenKind::Pub;
                    if self.at(TokenKind::Class) {
                        program.classes.push(self.parse_class(is_public));
                    } else if self.at(TokenKind::Fn) {
                        program.functions.push(self.parse_function(is_public));
                    } else {
                        self.sink.error(
                            codes::PARSE_UNEXPECTED_TOKEN,
                            self.span(),
                            "expected `class` or `fn` after visibility modifier",
                        );
                        self.synchronize();
                    }
                }
                _ => {
                    let token = self.bump();
                    self.sink.error(
                        codes::PARSE_UNEXPECTED_TOKEN,
                        token.span,
                        format!("unexpected token `{}` at top level", token.text),
                    );
                }
            }
        }
        program
    }

    /// `using ident ("." ident)* ";"`
    fn parse_using(&mut self) -> UsingDecl {
        let start = self.span().start;
        self.expect(TokenKind::Using, "expected `using`");
        let mut path = Vec::new();
        let first = self.expect(TokenKind::Ident, "expected module name");
        let path_start = first.span.start;
        let mut path_end = first.span.end;
        if !first.text.is_empty() {
            path.push(first.text);
        }
        while self.eat(TokenKind::Dot) {
            let seg = self.expect(TokenKind::Ident, "expected module name after `.`");
            path_end = seg.span.end.max(path_end);
            if !seg.text.is_empty() {
                path.push(seg.text);
            }
        }
        self.expect(TokenKind::Semicolon, "expected `;` after using declaration");
        UsingDecl {
            path,
            path_span: magolor_common::span::Span::new(path_start, path_end),
            span: self.span_from(start),
        }
    }

    /// `cimport <hdr.h>` | `cimport "hdr.h"`, with optional `as NS` and
    /// `(sym, ...)` symbol list.
    fn parse_cimport(&mut self) -> CImportDecl {
        let start = self.span().start;
        self.expect(TokenKind::CImport, "expected `cimport`");

        let mut header = String::new();
        let mut system = false;
        if self.eat(TokenKind::Lt) {
            // System header: cimport <stdio.h>
            system = true;
            let name = self.expect(TokenKind::Ident, "expected header name");
            header.push_str(&name.text);
            if self.eat(TokenKind::Dot) {
                let ext = self.expect(TokenKind::Ident, "expected header extension");
                header.push('.');
                header.push_str(&ext.text);
            }
            self.expect(TokenKind::Gt, "expected `>` after system header");
        } else {
            let name = self.expect(TokenKind::StringLiteral, "expected header name in quotes or <>");
            header = name.text;
        }

        let mut alias = None;
        if self.at(TokenKind::Ident) && self.current().text == "as" {
            self.bump();
            let ns = self.expect(TokenKind::Ident, "expected namespace name after `as`");
            if !ns.text.is_empty() {
                alias = Some(ns.text);
            }
        }

        let mut symbols = Vec::new();
        if self.eat(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    let sym = self.expect(TokenKind::Ident, "expected symbol name");
                    if !sym.text.is_empty() {
                        symbols.push(sym.text);
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "expected `)` after symbol list");
        }

        self.expect(TokenKind::Semicolon, "expected `;` after cimport");
        CImportDecl {
            header,
            system,
            alias,
            symbols,
            span: self.span_from(start),
        }
    }

    /// `class ident (":" ident)? "{" member* "}"` where each member is an
    /// optionally `pub`/`static`-prefixed field or method. Members default
    /// to private.
    fn parse_class(&mut self, is_public: bool) -> ClassDecl {
        let start = self.span().start;
        self.expect(TokenKind::Class, "expected `class`");
        let name_tok = self.expect(TokenKind::Ident, "expected class name");

        let mut parent = None;
        if self.eat(TokenKind::Colon) {
            let parent_tok = self.expect(TokenKind::Ident, "expected parent class name");
            if !parent_tok.text.is_empty() {
                parent = Some(parent_tok.text);
            }
        }

        self.expect(TokenKind::LBrace, "expected `{` after class name");

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let member_public = self.eat(TokenKind::Pub);
            let is_static = self.eat(TokenKind::Static);
            if self.at(TokenKind::Fn) {
                let mut method = self.parse_function(member_public);
                method.is_static = is_static;
                methods.push(method);
            } else if self.at(TokenKind::Ident) {
                let field_start = self.span().start;
                let field_name = self.bump();
                self.expect(TokenKind::Colon, "expected `:` after field name");
                let ty = self.parse_type();
                self.expect(TokenKind::Semicolon, "expected `;` after field declaration");
                fields.push(Field {
                    name: field_name.text,
                    name_span: field_name.span,
                    ty,
                    is_public: member_public,
                    span: self.span_from(field_start),
                });
            } else {
                self.sink.error(
                    codes::PARSE_UNEXPECTED_TOKEN,
                    self.span(),
                    format!(
                        "expected field or method in class body, found `{}`",
                        self.current().text
                    ),
                );
                self.synchronize();
            }
        }
        self.expect(TokenKind::RBrace, "expected `}` at end of class");

        ClassDecl {
            name: name_tok.text,
            name_span: name_tok.span,
            parent,
            fields,
            methods,
            is_public,
            span: self.span_from(start),
        }
    }

    /// `fn ident "(" params? ")" ("->" type)? block`
    pub(crate) fn parse_function(&mut self, is_public: bool) -> FnDecl {
        let start = self.span().start;
        self.expect(TokenKind::Fn, "expected `fn`");
        let name_tok = self.expect(TokenKind::Ident, "expected function name");
        self.expect(TokenKind::LParen, "expected `(` after function name");
        let params = self.parse_params();
        self.expect(TokenKind::RParen, "expected `)` after parameters");

        let ret = if self.eat(TokenKind::Arrow) {
            self.parse_type()
        } else {
            Type::Void
        };

        let body = self.parse_block();
        FnDecl {
            name: name_tok.text,
            name_span: name_tok.span,
            params,
            ret,
            body,
            is_public,
            is_static: false,
            span: self.span_from(start),
        }
    }

    /// Comma-separated `name: type` list; the caller owns the parentheses.
    pub(crate) fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.at(TokenKind::RParen) {
            return params;
        }
        loop {
            let start = self.span().start;
            let name = self.expect(TokenKind::Ident, "expected parameter name");
            self.expect(TokenKind::Colon, "expected `:` after parameter name");
            let ty = self.parse_type();
            params.push(Param {
                name: name.text,
                ty,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    /// Type syntax: primitives, `fn(T, ...) -> T`, `Option<T>`, `Array<T>`,
    /// or a class name.
    pub(crate) fn parse_type(&mut self) -> Type {
        if self.at(TokenKind::Fn) {
            return self.parse_function_type();
        }

        let token = self.bump();
        match token.kind {
            TokenKind::IntTy => Type::Int,
            TokenKind::FloatTy => Type::Float,
            TokenKind::StringTy => Type::String,
            TokenKind::BoolTy => Type::Bool,
            TokenKind::VoidTy => Type::Void,
            TokenKind::Ident => match token.text.as_str() {
                "Option" if self.at(TokenKind::Lt) => {
                    self.bump();
                    let inner = self.parse_type();
                    self.expect(TokenKind::Gt, "expected `>` to close `Option<`");
                    Type::Option(Box::new(inner))
                }
                "Array" if self.at(TokenKind::Lt) => {
                    self.bump();
                    let elem = self.parse_type();
                    self.expect(TokenKind::Gt, "expected `>` to close `Array<`");
                    Type::Array(Box::new(elem))
                }
                _ => Type::Class(token.text),
            },
            _ => {
                self.sink.error(
                    codes::PARSE_EXPECTED_TYPE,
                    token.span,
                    format!("expected type, found `{}`", token.text),
                );
                Type::Error
            }
        }
    }

    /// `fn "(" (type ("," type)*)? ")" "->" type`
    fn parse_function_type(&mut self) -> Type {
        self.expect(TokenKind::Fn, "expected `fn`");
        self.expect(TokenKind::LParen, "expected `(` in function type");
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.parse_type());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected `)` in function type");
        self.expect(TokenKind::Arrow, "expected `->` in function type");
        let ret = self.parse_type();
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }
}
