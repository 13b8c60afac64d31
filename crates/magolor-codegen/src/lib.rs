//! C++ code generation for the Magolor compiler.
//!
//! The generator streams the checked AST into C++17 source text. It keeps
//! no analysis state of its own -- only the output buffer, the current
//! indentation, and the set of module paths that lower to `::` access. It
//! trusts the checker: type slots are read, never computed.
//!
//! Lowering notes:
//! - every binary and unary form is wrapped in explicit parentheses to
//!   sidestep precedence differences;
//! - interpolated strings become left-to-right `+` concatenation over
//!   `std::string` pieces and `mg_to_string(name)` calls;
//! - `match` over an option becomes a lexical scope binding `_match_val`
//!   and an `if`/`else if` presence chain;
//! - forward declarations of all non-main functions precede definitions so
//!   source order never matters;
//! - `main` receives the fixed `int main()` signature and an implicit
//!   trailing `return 0`.

pub mod prelude;

use rustc_hash::FxHashSet;

use magolor_parser::ast::{
    ClassDecl, Expr, ExprKind, FnDecl, Pattern, Program, Stmt, StmtKind, Type,
};

/// Generate a complete C++ program for a checked compilation unit.
pub fn generate(program: &Program) -> String {
    CodeGen::new().generate(program)
}

/// The streaming emitter.
pub struct CodeGen {
    out: String,
    indent: usize,
    /// Dotted paths that name modules (imports of the merged program);
    /// member access rooted in one of these is not a value access.
    module_paths: FxHashSet<String>,
}

impl CodeGen {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            module_paths: FxHashSet::default(),
        }
    }

    pub fn generate(&mut self, program: &Program) -> String {
        self.out.clear();
        self.module_paths = program.usings.iter().map(|u| u.dotted()).collect();

        // Foreign includes first, then the prelude.
        for cimport in &program.cimports {
            if cimport.system {
                self.emit_line(&format!("#include <{}>", cimport.header));
            } else {
                self.emit_line(&format!("#include \"{}\"", cimport.header));
            }
        }
        if !program.cimports.is_empty() {
            self.emit_line("");
        }

        let used_std: FxHashSet<String> = program
            .usings
            .iter()
            .filter_map(|u| u.dotted().strip_prefix("Std.").map(str::to_string))
            .collect();
        self.out.push_str(&prelude::emit_prelude(&used_std));

        for class in &program.classes {
            self.gen_class(class);
        }

        // Forward declarations keep declaration order irrelevant.
        for function in &program.functions {
            if function.name != "main" {
                self.emit(&format!(
                    "{} {}(",
                    cpp_type(&function.ret),
                    function.name
                ));
                for (i, param) in function.params.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.emit(&format!("{} {}", cpp_type(&param.ty), param.name));
                }
                self.emit(");\n");
            }
        }
        self.emit_line("");

        for function in &program.functions {
            self.gen_function(function, None);
            self.emit_line("");
        }

        std::mem::take(&mut self.out)
    }

    // ── Emit helpers ───────────────────────────────────────────────────

    fn emit(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn emit_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn emit_line(&mut self, s: &str) {
        self.emit_indent();
        self.out.push_str(s);
        self.out.push('\n');
    }

    // ── Declarations ───────────────────────────────────────────────────

    fn gen_class(&mut self, class: &ClassDecl) {
        match &class.parent {
            Some(parent) => self.emit_line(&format!("class {} : public {} {{", class.name, parent)),
            None => self.emit_line(&format!("class {} {{", class.name)),
        }
        self.emit_line("public:");
        self.indent += 1;

        for field in &class.fields {
            self.emit_line(&format!("{} {};", cpp_type(&field.ty), field.name));
        }

        // Positional constructor over the declared fields, or a bare
        // no-arg constructor when there are none.
        if class.fields.is_empty() {
            self.emit_line(&format!("{}() {{}}", class.name));
        } else {
            self.emit_indent();
            self.emit(&format!("{}(", class.name));
            for (i, field) in class.fields.iter().enumerate() {
                if i > 0 {
                    self.emit(", ");
                }
                self.emit(&format!("{} _{}", cpp_type(&field.ty), field.name));
            }
            self.emit(") : ");
            for (i, field) in class.fields.iter().enumerate() {
                if i > 0 {
                    self.emit(", ");
                }
                self.emit(&format!("{}(_{})", field.name, field.name));
            }
            self.emit(" {}\n");
        }

        for method in &class.methods {
            self.gen_function(method, Some(&class.name));
        }

        self.indent -= 1;
        self.emit_line("};");
        self.emit_line("");
    }

    fn gen_function(&mut self, function: &FnDecl, class: Option<&str>) {
        let is_main = function.name == "main" && class.is_none();
        if is_main {
            self.emit_line("int main() {");
        } else {
            self.emit_indent();
            if function.is_static && class.is_some() {
                self.emit("static ");
            }
            self.emit(&format!("{} {}(", cpp_type(&function.ret), function.name));
            for (i, param) in function.params.iter().enumerate() {
                if i > 0 {
                    self.emit(", ");
                }
                self.emit(&format!("{} {}", cpp_type(&param.ty), param.name));
            }
            self.emit(") {\n");
        }

        self.indent += 1;
        for stmt in &function.body {
            self.gen_stmt(stmt);
        }
        if is_main {
            self.emit_line("return 0;");
        }
        self.indent -= 1;
        self.emit_line("}");
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, ty, init, .. } => {
                self.emit_indent();
                match ty {
                    Some(annotated) => self.emit(&cpp_type(annotated)),
                    None => self.emit("auto"),
                }
                self.emit(&format!(" {name} = "));
                self.gen_expr(init);
                self.emit(";\n");
            }
            StmtKind::Return(value) => {
                self.emit_indent();
                self.emit("return");
                if let Some(expr) = value {
                    self.emit(" ");
                    self.gen_expr(expr);
                }
                self.emit(";\n");
            }
            StmtKind::Expr(expr) => {
                self.emit_indent();
                self.gen_expr(expr);
                self.emit(";\n");
            }
            StmtKind::If { cond, then_body, else_body } => {
                self.emit_indent();
                self.emit("if (");
                self.gen_expr(cond);
                self.emit(") {\n");
                self.indent += 1;
                for inner in then_body {
                    self.gen_stmt(inner);
                }
                self.indent -= 1;
                self.emit_line("}");
                if !else_body.is_empty() {
                    self.emit_line("else {");
                    self.indent += 1;
                    for inner in else_body {
                        self.gen_stmt(inner);
                    }
                    self.indent -= 1;
                    self.emit_line("}");
                }
            }
            StmtKind::While { cond, body } => {
                self.emit_indent();
                self.emit("while (");
                self.gen_expr(cond);
                self.emit(") {\n");
                self.indent += 1;
                for inner in body {
                    self.gen_stmt(inner);
                }
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::For { var, iterable, body, .. } => {
                self.emit_indent();
                self.emit(&format!("for (auto& {var} : "));
                self.gen_expr(iterable);
                self.emit(") {\n");
                self.indent += 1;
                for inner in body {
                    self.gen_stmt(inner);
                }
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::Match { scrutinee, arms } => {
                // A fresh lexical scope binding `_match_val`, then an
                // if/else if presence chain.
                self.emit_line("{");
                self.indent += 1;
                self.emit_indent();
                self.emit("auto _match_val = ");
                self.gen_expr(scrutinee);
                self.emit(";\n");

                let mut first = true;
                for arm in arms {
                    self.emit_indent();
                    if !first {
                        self.emit("else ");
                    }
                    first = false;
                    match &arm.pattern {
                        Pattern::Some => {
                            self.emit("if (_match_val.has_value()) {\n");
                            self.indent += 1;
                            if let Some(binder) = &arm.binder {
                                self.emit_line(&format!("auto {binder} = _match_val.value();"));
                            }
                        }
                        Pattern::None => {
                            self.emit("if (!_match_val.has_value()) {\n");
                            self.indent += 1;
                        }
                        Pattern::Name(name) => {
                            self.emit(&format!("if (_match_val == {name}) {{\n"));
                            self.indent += 1;
                        }
                    }
                    for inner in &arm.body {
                        self.gen_stmt(inner);
                    }
                    self.indent -= 1;
                    self.emit_line("}");
                }
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::Block(stmts) => {
                self.emit_line("{");
                self.indent += 1;
                for inner in stmts {
                    self.gen_stmt(inner);
                }
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::Raw(code) => {
                for line in code.trim_matches('\n').lines() {
                    self.emit_line(line.trim_end());
                }
            }
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn gen_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(value) => self.emit(&value.to_string()),
            ExprKind::Float(value) => {
                let mut text = value.to_string();
                if !text.contains('.') && !text.contains('e') {
                    text.push_str(".0");
                }
                self.emit(&text);
            }
            ExprKind::Bool(value) => self.emit(if *value { "true" } else { "false" }),
            ExprKind::Str { value, interpolated } => {
                if *interpolated {
                    self.gen_interpolated(value);
                } else {
                    self.emit("std::string(\"");
                    self.emit(&escape_cpp(value));
                    self.emit("\")");
                }
            }
            ExprKind::Ident(name) => self.emit(name),
            ExprKind::Binary { op, lhs, rhs } => {
                self.emit("(");
                self.gen_expr(lhs);
                self.emit(&format!(" {} ", op.as_str()));
                self.gen_expr(rhs);
                self.emit(")");
            }
            ExprKind::Unary { op, operand } => {
                self.emit("(");
                self.emit(op.as_str());
                self.gen_expr(operand);
                self.emit(")");
            }
            ExprKind::Call { callee, args } => {
                self.gen_expr(callee);
                self.emit("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.gen_expr(arg);
                }
                self.emit(")");
            }
            ExprKind::Member { object, name, .. } => {
                if let Some(segments) = self.module_path_segments(object) {
                    if segments[0] == "Std" {
                        // Builtin modules are namespaces in the target.
                        self.emit(&segments.join("::"));
                        self.emit(&format!("::{name}"));
                    } else {
                        // User modules are merged into one unit; their
                        // symbols are reachable unqualified.
                        self.emit(name);
                    }
                } else {
                    self.gen_expr(object);
                    self.emit(&format!(".{name}"));
                }
            }
            ExprKind::Index { object, index } => {
                self.gen_expr(object);
                self.emit("[");
                self.gen_expr(index);
                self.emit("]");
            }
            ExprKind::Lambda { params, ret, body } => {
                self.emit("[=](");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.emit(&format!("{} {}", cpp_type(&param.ty), param.name));
                }
                self.emit(")");
                if let Some(ret) = ret {
                    self.emit(&format!(" -> {}", cpp_type(ret)));
                }
                self.emit(" {\n");
                self.indent += 1;
                for stmt in body {
                    self.gen_stmt(stmt);
                }
                self.indent -= 1;
                self.emit_indent();
                self.emit("}");
            }
            ExprKind::New { class, args } => {
                self.emit(&format!("{class}("));
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.gen_expr(arg);
                }
                self.emit(")");
            }
            ExprKind::Some(inner) => {
                self.emit("std::make_optional(");
                self.gen_expr(inner);
                self.emit(")");
            }
            ExprKind::None => self.emit("std::nullopt"),
            ExprKind::This => self.emit("(*this)"),
            ExprKind::Array(elements) => {
                self.emit("{");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ");
                    }
                    self.gen_expr(element);
                }
                self.emit("}");
            }
        }
    }

    /// Interpolated string -> parenthesized concatenation of escaped
    /// literal pieces and `mg_to_string(ident)` calls.
    fn gen_interpolated(&mut self, value: &str) {
        let mut pieces: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut rest = value;
        loop {
            // A `{` without a closing brace stays literal text.
            let Some(open) = rest.find('{') else { break };
            let Some(close) = rest[open..].find('}') else { break };
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                pieces.push(format!("std::string(\"{}\")", escape_cpp(&literal)));
                literal.clear();
            }
            let name = &rest[open + 1..open + close];
            pieces.push(format!("mg_to_string({})", name.trim()));
            rest = &rest[open + close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(format!("std::string(\"{}\")", escape_cpp(&literal)));
        }

        if pieces.is_empty() {
            self.emit("std::string(\"\")");
            return;
        }
        self.emit("(");
        self.emit(&pieces.join(" + "));
        self.emit(")");
    }

    /// If the expression is a dotted identifier chain naming a module,
    /// return its segments.
    fn module_path_segments(&self, expr: &Expr) -> Option<Vec<String>> {
        fn collect(expr: &Expr, segments: &mut Vec<String>) -> bool {
            match &expr.kind {
                ExprKind::Ident(name) => {
                    segments.push(name.clone());
                    true
                }
                ExprKind::Member { object, name, .. } => {
                    if !collect(object, segments) {
                        return false;
                    }
                    segments.push(name.clone());
                    true
                }
                _ => false,
            }
        }
        let mut segments = Vec::new();
        if !collect(expr, &mut segments) {
            return None;
        }
        let path = segments.join(".");
        // A checked AST marks module-path chains `void`; a value-typed chain
        // is a real variable even when it shadows a module name.
        let is_module = match &expr.ty {
            Some(Type::Void) | None => {
                segments[0] == "Std" || self.module_paths.contains(&path)
            }
            Some(_) => false,
        };
        if is_module {
            Some(segments)
        } else {
            None
        }
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface type -> C++ type.
fn cpp_type(ty: &Type) -> String {
    match ty {
        Type::Int => "int".to_string(),
        Type::Float => "double".to_string(),
        Type::String => "std::string".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Void => "void".to_string(),
        Type::Class(name) => name.clone(),
        Type::Option(inner) => format!("std::optional<{}>", cpp_type(inner)),
        Type::Array(elem) => format!("std::vector<{}>", cpp_type(elem)),
        Type::Function { params, ret } => {
            let rendered: Vec<String> = params.iter().map(|p| cpp_type(p)).collect();
            format!("std::function<{}({})>", cpp_type(ret), rendered.join(", "))
        }
        Type::Error => "auto".to_string(),
    }
}

/// Escape a cooked string value back into C++ literal syntax.
fn escape_cpp(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
