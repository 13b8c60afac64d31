use magolor_common::span::Span;

use crate::ast::stmt::Stmt;
use crate::ast::ty::Type;

/// A function or lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

/// `using A.B.C;`
#[derive(Debug, Clone, PartialEq)]
pub struct UsingDecl {
    pub path: Vec<String>,
    /// Span of the dotted path only, excluding `using` and `;`.
    pub path_span: Span,
    pub span: Span,
}

impl UsingDecl {
    /// The dotted module path, e.g. `"Std.IO"`.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// `cimport <stdio.h> as IO (printf, puts);`
#[derive(Debug, Clone, PartialEq)]
pub struct CImportDecl {
    pub header: String,
    /// `<header>` vs `"header"`.
    pub system: bool,
    pub alias: Option<String>,
    pub symbols: Vec<String>,
    pub span: Span,
}

/// A function or method declaration.
///
/// Top-level functions default to public; class members default to private
/// and opt in with `pub`.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Vec<Stmt>,
    pub is_public: bool,
    pub is_static: bool,
    pub span: Span,
}

/// A class field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub name_span: Span,
    pub ty: Type,
    pub is_public: bool,
    pub span: Span,
}

/// A class declaration with an optional parent class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub name_span: Span,
    pub parent: Option<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<FnDecl>,
    pub is_public: bool,
    pub span: Span,
}

impl ClassDecl {
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_method(&self, name: &str) -> Option<&FnDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A compilation unit: the parsed contents of one source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub usings: Vec<UsingDecl>,
    pub cimports: Vec<CImportDecl>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FnDecl>,
}

impl Program {
    pub fn find_class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&FnDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}
