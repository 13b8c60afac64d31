use magolor_common::span::Span;

use crate::ast::expr::Expr;
use crate::ast::ty::Type;

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let {
        name: String,
        name_span: Span,
        ty: Option<Type>,
        init: Expr,
        mutable: bool,
    },
    Return(Option<Expr>),
    Expr(Expr),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        /// `else if` chains nest as a single If statement in here.
        else_body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        var_span: Span,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Match {
        scrutinee: Expr,
        arms: Vec<MatchArm>,
    },
    Block(Vec<Stmt>),
    /// Opaque raw C++ escape hatch, emitted verbatim.
    Raw(String),
}

/// One arm of a `match` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub pattern_span: Span,
    /// Binder from `Some(x)`; `None` patterns never bind.
    pub binder: Option<String>,
    pub body: Vec<Stmt>,
}

/// Match patterns. Match is defined over option values; other names fall
/// back to an equality comparison in the generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Some,
    None,
    Name(String),
}
