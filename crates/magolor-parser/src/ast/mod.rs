//! Typed AST for the Magolor language.
//!
//! Nodes are owned tagged sums stored inline or behind a single `Box`; no
//! node has more than one owner. Every node carries a [`Span`] into its
//! source unit, and every expression carries a type slot the checker fills.

pub mod expr;
pub mod item;
pub mod stmt;
pub mod ty;

pub use expr::{BinOp, Expr, ExprKind, UnOp};
pub use item::{CImportDecl, ClassDecl, Field, FnDecl, Param, Program, UsingDecl};
pub use stmt::{MatchArm, Pattern, Stmt, StmtKind};
pub use ty::Type;
