//! File-scoped semantic index.
//!
//! For every open document the index keeps the symbols the real parse
//! produced (classes, fields, methods, functions, parameters, variables),
//! each with its definition location, recorded references, and rendered
//! signature, plus the document's import scope. It answers position ->
//! symbol and feeds the completion engine.

use lsp_types::{Position, Range};
use rustc_hash::FxHashMap;

use magolor_common::diagnostics::DiagnosticSink;
use magolor_common::span::{LineIndex, Span};
use magolor_parser::ast::{Expr, ExprKind, FnDecl, Program, Stmt, StmtKind, Type};
use magolor_parser::parse_source;
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_typeck::check_registered;

/// Symbol classification, aligned with LSP symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Method,
    Variable,
    Parameter,
    Class,
    Field,
    Module,
}

impl SymbolKind {
    pub fn to_lsp(self) -> lsp_types::SymbolKind {
        match self {
            SymbolKind::Function => lsp_types::SymbolKind::FUNCTION,
            SymbolKind::Method => lsp_types::SymbolKind::METHOD,
            SymbolKind::Variable => lsp_types::SymbolKind::VARIABLE,
            SymbolKind::Parameter => lsp_types::SymbolKind::VARIABLE,
            SymbolKind::Class => lsp_types::SymbolKind::CLASS,
            SymbolKind::Field => lsp_types::SymbolKind::FIELD,
            SymbolKind::Module => lsp_types::SymbolKind::MODULE,
        }
    }
}

/// A location inside one document, by URI string.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLocation {
    pub uri: String,
    pub range: Range,
}

/// One extracted symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Rendered type, e.g. `"int"` for a variable.
    pub type_repr: String,
    pub definition: SymbolLocation,
    pub references: Vec<SymbolLocation>,
    /// Signature suffix for callables, e.g. `"(int, int) -> int"`.
    pub detail: String,
    pub documentation: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_callable: bool,
    /// Enclosing class for members, enclosing function for locals.
    pub container: Option<String>,
    pub param_types: Vec<String>,
    pub return_type: String,
}

/// One resolved `using` in a document's scope.
#[derive(Debug, Clone)]
pub struct ImportedModule {
    pub full_path: String,
    /// Exported names, filled from the stdlib catalog for builtin paths.
    pub symbols: Vec<String>,
}

#[derive(Debug, Default)]
struct FileIndex {
    symbols: Vec<Symbol>,
    imports: Vec<ImportedModule>,
}

/// URI -> extracted file index.
#[derive(Debug, Default)]
pub struct SemanticIndex {
    files: FxHashMap<String, FileIndex>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-extract a document from source. Runs the shared front-end
    /// (parse, register, resolve, check) with a throwaway sink; extraction
    /// works on whatever best-effort AST comes back.
    pub fn analyze(&mut self, uri: &str, content: &str) {
        let mut sink = DiagnosticSink::new(uri);
        let ast = parse_source(content, &mut sink);
        let mut registry = ModuleRegistry::new();
        registry.register(Module::new("current", uri, ast));
        resolver::resolve_imports(&mut registry, "current", &mut sink);
        check_registered(&mut registry, "current", &mut sink);
        let module = registry.remove("current").expect("current module is registered");

        let mut extractor = Extractor {
            uri,
            lines: LineIndex::new(content),
            symbols: Vec::new(),
            references: Vec::new(),
        };
        extractor.extract_program(&module.ast);

        let imports = module
            .ast
            .usings
            .iter()
            .map(|using| {
                let full_path = using.dotted();
                let symbols = magolor_stdlib::catalog()
                    .module_symbols(&full_path)
                    .iter()
                    .map(|f| f.name.to_string())
                    .collect();
                ImportedModule { full_path, symbols }
            })
            .collect();

        let mut symbols = extractor.symbols;
        // Attach collected identifier references to same-named symbols.
        for (name, range) in extractor.references {
            if let Some(symbol) = symbols.iter_mut().find(|s| s.name == name) {
                if symbol.definition.range != range {
                    let location = SymbolLocation { uri: uri.to_string(), range };
                    if !symbol.references.contains(&location) {
                        symbol.references.push(location);
                    }
                }
            }
        }

        self.files.insert(uri.to_string(), FileIndex { symbols, imports });
    }

    pub fn remove(&mut self, uri: &str) {
        self.files.remove(uri);
    }

    /// The symbol whose definition or one of whose references covers the
    /// position.
    pub fn symbol_at(&self, uri: &str, position: &Position) -> Option<&Symbol> {
        let file = self.files.get(uri)?;
        for symbol in &file.symbols {
            if range_covers(&symbol.definition.range, position) {
                return Some(symbol);
            }
            if symbol.references.iter().any(|r| r.uri == uri && range_covers(&r.range, position)) {
                return Some(symbol);
            }
        }
        None
    }

    /// Every callable symbol of the file.
    pub fn callables(&self, uri: &str) -> Vec<&Symbol> {
        self.files
            .get(uri)
            .map(|f| f.symbols.iter().filter(|s| s.is_callable).collect())
            .unwrap_or_default()
    }

    /// Variables and parameters declared at or above the position's line.
    pub fn variables_in_scope(&self, uri: &str, position: &Position) -> Vec<&Symbol> {
        self.files
            .get(uri)
            .map(|f| {
                f.symbols
                    .iter()
                    .filter(|s| {
                        matches!(s.kind, SymbolKind::Variable | SymbolKind::Parameter)
                            && s.definition.range.start.line <= position.line
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_symbols(&self, uri: &str) -> &[Symbol] {
        self.files.get(uri).map(|f| f.symbols.as_slice()).unwrap_or(&[])
    }

    pub fn imported_modules(&self, uri: &str) -> &[ImportedModule] {
        self.files.get(uri).map(|f| f.imports.as_slice()).unwrap_or(&[])
    }
}

fn range_covers(range: &Range, position: &Position) -> bool {
    range.start.line == position.line
        && range.start.character <= position.character
        && position.character <= range.end.character
}

// ── Extraction ─────────────────────────────────────────────────────────

struct Extractor<'a> {
    uri: &'a str,
    lines: LineIndex,
    symbols: Vec<Symbol>,
    /// `(name, range)` pairs of every identifier-shaped use site.
    references: Vec<(String, Range)>,
}

impl Extractor<'_> {
    fn span_range(&self, span: Span) -> Range {
        let (start_line, start_col) = self.lines.line_col(span.start);
        let (end_line, end_col) = self.lines.line_col(span.end);
        Range {
            start: Position { line: start_line - 1, character: start_col - 1 },
            end: Position { line: end_line - 1, character: end_col - 1 },
        }
    }

    fn location(&self, span: Span) -> SymbolLocation {
        SymbolLocation {
            uri: self.uri.to_string(),
            range: self.span_range(span),
        }
    }

    fn symbol(&self, name: &str, kind: SymbolKind, span: Span) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            type_repr: String::new(),
            definition: self.location(span),
            references: Vec::new(),
            detail: String::new(),
            documentation: String::new(),
            is_public: false,
            is_static: false,
            is_callable: false,
            container: None,
            param_types: Vec::new(),
            return_type: String::new(),
        }
    }

    fn extract_program(&mut self, program: &Program) {
        for class in &program.classes {
            let mut class_symbol = self.symbol(&class.name, SymbolKind::Class, class.name_span);
            class_symbol.is_public = class.is_public;
            class_symbol.type_repr = class.name.clone();
            class_symbol.detail = format!("class {}", class.name);
            self.symbols.push(class_symbol);

            for field in &class.fields {
                let mut field_symbol = self.symbol(&field.name, SymbolKind::Field, field.name_span);
                field_symbol.is_public = field.is_public;
                field_symbol.type_repr = field.ty.to_string();
                field_symbol.container = Some(class.name.clone());
                self.symbols.push(field_symbol);
            }

            for method in &class.methods {
                self.extract_callable(method, Some(&class.name));
            }
        }

        for function in &program.functions {
            self.extract_callable(function, None);
        }
    }

    fn extract_callable(&mut self, decl: &FnDecl, class: Option<&str>) {
        let kind = if class.is_some() { SymbolKind::Method } else { SymbolKind::Function };
        let param_types: Vec<String> = decl.params.iter().map(|p| p.ty.to_string()).collect();
        let mut symbol = self.symbol(&decl.name, kind, decl.name_span);
        symbol.is_public = decl.is_public;
        symbol.is_static = decl.is_static;
        symbol.is_callable = true;
        symbol.detail = format!("({}) -> {}", param_types.join(", "), decl.ret);
        symbol.param_types = param_types;
        symbol.return_type = decl.ret.to_string();
        symbol.container = class.map(str::to_string);
        self.symbols.push(symbol);

        for param in &decl.params {
            let mut param_symbol = self.symbol(&param.name, SymbolKind::Parameter, param.span);
            param_symbol.type_repr = param.ty.to_string();
            param_symbol.container = Some(decl.name.clone());
            self.symbols.push(param_symbol);
        }

        for stmt in &decl.body {
            self.extract_stmt(stmt, &decl.name);
        }
    }

    fn extract_stmt(&mut self, stmt: &Stmt, container: &str) {
        match &stmt.kind {
            StmtKind::Let { name, name_span, ty, init, .. } => {
                let mut symbol = self.symbol(name, SymbolKind::Variable, *name_span);
                symbol.type_repr = match (ty, &init.ty) {
                    (Some(annotated), _) => annotated.to_string(),
                    (None, Some(inferred)) if *inferred != Type::Error => inferred.to_string(),
                    _ => String::new(),
                };
                symbol.container = Some(container.to_string());
                self.symbols.push(symbol);
                self.extract_expr(init, container);
            }
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    self.extract_expr(expr, container);
                }
            }
            StmtKind::Expr(expr) => self.extract_expr(expr, container),
            StmtKind::If { cond, then_body, else_body } => {
                self.extract_expr(cond, container);
                for inner in then_body.iter().chain(else_body) {
                    self.extract_stmt(inner, container);
                }
            }
            StmtKind::While { cond, body } => {
                self.extract_expr(cond, container);
                for inner in body {
                    self.extract_stmt(inner, container);
                }
            }
            StmtKind::For { var, var_span, iterable, body } => {
                let mut symbol = self.symbol(var, SymbolKind::Variable, *var_span);
                symbol.container = Some(container.to_string());
                self.symbols.push(symbol);
                self.extract_expr(iterable, container);
                for inner in body {
                    self.extract_stmt(inner, container);
                }
            }
            StmtKind::Match { scrutinee, arms } => {
                self.extract_expr(scrutinee, container);
                for arm in arms {
                    for inner in &arm.body {
                        self.extract_stmt(inner, container);
                    }
                }
            }
            StmtKind::Block(stmts) => {
                for inner in stmts {
                    self.extract_stmt(inner, container);
                }
            }
            StmtKind::Raw(_) => {}
        }
    }

    fn extract_expr(&mut self, expr: &Expr, container: &str) {
        match &expr.kind {
            ExprKind::Ident(name) => {
                self.references.push((name.clone(), self.span_range(expr.span)));
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.extract_expr(lhs, container);
                self.extract_expr(rhs, container);
            }
            ExprKind::Unary { operand, .. } => self.extract_expr(operand, container),
            ExprKind::Call { callee, args } => {
                self.extract_expr(callee, container);
                for arg in args {
                    self.extract_expr(arg, container);
                }
            }
            ExprKind::Member { object, name, name_span } => {
                self.extract_expr(object, container);
                self.references.push((name.clone(), self.span_range(*name_span)));
            }
            ExprKind::Index { object, index } => {
                self.extract_expr(object, container);
                self.extract_expr(index, container);
            }
            ExprKind::Lambda { params, body, .. } => {
                for param in params {
                    let mut symbol = self.symbol(&param.name, SymbolKind::Parameter, param.span);
                    symbol.type_repr = param.ty.to_string();
                    symbol.container = Some(container.to_string());
                    self.symbols.push(symbol);
                }
                for stmt in body {
                    self.extract_stmt(stmt, container);
                }
            }
            ExprKind::New { args, .. } => {
                for arg in args {
                    self.extract_expr(arg, container);
                }
            }
            ExprKind::Some(inner) => self.extract_expr(inner, container),
            ExprKind::Array(elements) => {
                for element in elements {
                    self.extract_expr(element, container);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed(content: &str) -> SemanticIndex {
        let mut index = SemanticIndex::new();
        index.analyze("file:///t.mg", content);
        index
    }

    #[test]
    fn extracts_functions_classes_and_members() {
        let index = analyzed(
            "class Point { pub x: int; pub fn sum() -> int { return x; } }\n\
             fn twice(v: int) -> int { return v * 2; }\n",
        );
        let symbols = index.all_symbols("file:///t.mg");
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Point"));
        assert!(names.contains(&"x"));
        assert!(names.contains(&"sum"));
        assert!(names.contains(&"twice"));
        assert!(names.contains(&"v"));

        let sum = symbols.iter().find(|s| s.name == "sum").unwrap();
        assert_eq!(sum.kind, SymbolKind::Method);
        assert!(sum.is_callable);
        assert_eq!(sum.container.as_deref(), Some("Point"));
        assert_eq!(sum.detail, "() -> int");

        let twice = symbols.iter().find(|s| s.name == "twice").unwrap();
        assert_eq!(twice.kind, SymbolKind::Function);
        assert_eq!(twice.param_types, vec!["int"]);
        assert_eq!(twice.return_type, "int");
    }

    #[test]
    fn records_references() {
        let index = analyzed("fn foo() {}\nfn main() { foo(); foo(); }\n");
        let foo = index
            .all_symbols("file:///t.mg")
            .iter()
            .find(|s| s.name == "foo")
            .unwrap();
        assert_eq!(foo.references.len(), 2, "{:?}", foo.references);
    }

    #[test]
    fn symbol_at_definition_and_reference() {
        let content = "fn foo() {}\nfn main() { foo(); }\n";
        let index = analyzed(content);
        // On the definition (line 0, inside `foo`).
        let at_def = index.symbol_at("file:///t.mg", &Position { line: 0, character: 4 }).unwrap();
        assert_eq!(at_def.name, "foo");
        // On the call site (line 1).
        let at_ref = index.symbol_at("file:///t.mg", &Position { line: 1, character: 13 }).unwrap();
        assert_eq!(at_ref.name, "foo");
        // On empty space.
        assert!(index.symbol_at("file:///t.mg", &Position { line: 0, character: 10 }).is_none());
    }

    #[test]
    fn variables_in_scope_respect_position() {
        let index = analyzed("fn main() {\nlet a = 1;\nlet b = 2;\n}\n");
        let before_b = index.variables_in_scope("file:///t.mg", &Position { line: 1, character: 0 });
        let names: Vec<&str> = before_b.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"a"));
        assert!(!names.contains(&"b"));
    }

    #[test]
    fn variable_types_come_from_the_checker() {
        let index = analyzed("fn main() { let n = 41 + 1; }\n");
        let n = index
            .all_symbols("file:///t.mg")
            .iter()
            .find(|s| s.name == "n")
            .unwrap();
        assert_eq!(n.type_repr, "int");
    }

    #[test]
    fn builtin_imports_carry_symbol_sets() {
        let index = analyzed("using Std.IO;\nusing Std.Math;\nfn main() {}\n");
        let imports = index.imported_modules("file:///t.mg");
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].full_path, "Std.IO");
        assert!(imports[0].symbols.contains(&"println".to_string()));
        assert!(imports[1].symbols.contains(&"sqrt".to_string()));
    }

    #[test]
    fn broken_sources_still_index() {
        // Parser recovery keeps whatever declarations it could read.
        let index = analyzed("fn good() {}\nfn bad( {\n");
        let names: Vec<&str> = index
            .all_symbols("file:///t.mg")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert!(names.contains(&"good"));
    }
}
