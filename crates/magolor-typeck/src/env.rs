//! Lexical scope stack for the checker.

use rustc_hash::FxHashMap;

use magolor_parser::ast::Type;

/// What the checker knows about one bound name.
#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: Type,
    pub mutable: bool,
}

/// A stack of nested scopes. Lookup walks from the innermost scope out.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, VarInfo>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: vec![FxHashMap::default()] }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the top scope");
        self.scopes.pop();
    }

    /// Bind a name in the innermost scope, shadowing outer bindings.
    pub fn define(&mut self, name: impl Into<String>, ty: Type, mutable: bool) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.into(), VarInfo { ty, mutable });
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
