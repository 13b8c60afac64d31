//! Expression and statement typing tests over single-module sources.

use magolor_common::diagnostics::{Diagnostic, DiagnosticSink, Severity};
use magolor_parser::ast::{Expr, ExprKind, Program, Stmt, StmtKind, Type};
use magolor_parser::parse_source;
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_typeck::check_registered;

/// Parse, register, resolve, and check a single module named `main`.
fn check(source: &str) -> (ModuleRegistry, Vec<Diagnostic>) {
    let mut sink = DiagnosticSink::new("main.mg");
    let ast = parse_source(source, &mut sink);
    assert!(!sink.has_error(), "fixture must parse: {:?}", sink.diagnostics());
    let mut registry = ModuleRegistry::new();
    registry.register(Module::new("main", "src/main.mg", ast));
    resolver::resolve_imports(&mut registry, "main", &mut sink);
    check_registered(&mut registry, "main", &mut sink);
    (registry, sink.into_sorted())
}

fn errors(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
    diags.iter().filter(|d| d.severity == Severity::Error).collect()
}

#[test]
fn hello_interpolation_checks_clean() {
    // Scenario S1: zero diagnostics.
    let (_, diags) = check(
        "using Std.IO;\nfn main() { let name = \"world\"; Std.print($\"Hello, {name}\\n\"); }",
    );
    assert!(diags.is_empty(), "expected zero diagnostics, got {diags:?}");
}

#[test]
fn let_infers_and_checks_annotations() {
    let (_, diags) = check("fn f() { let x = 1; let y: float = x; let s: string = \"hi\"; }");
    assert!(diags.is_empty(), "int widens to float: {diags:?}");

    let (_, diags) = check("fn f() { let x: int = \"oops\"; }");
    let errs = errors(&diags);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("expected `int`, found `string`"));
}

#[test]
fn arithmetic_widens_to_float() {
    let (registry, diags) = check("fn f() -> float { let a = 1; let b = 2.5; return a + b; }");
    assert!(diags.is_empty(), "{diags:?}");
    // The returned expression is typed float.
    let module = registry.get("main").unwrap();
    let StmtKind::Return(Some(expr)) = &module.ast.functions[0].body[2].kind else {
        panic!("expected return");
    };
    assert_eq!(expr.ty, Some(Type::Float));
}

#[test]
fn string_concatenation_with_plus() {
    let (_, diags) = check("fn f() -> string { return \"a\" + \"b\"; }");
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn option_accepts_some_and_none() {
    let (_, diags) = check(
        "fn f() { let a: Option<int> = Some(1); let b: Option<int> = None; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn option_match_binds_inner_type() {
    // Scenario S4.
    let (_, diags) = check(
        "fn f(o: Option<int>) -> int { match o { Some(x) => return x; None => return -1; } }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn forward_references_and_mutual_recursion() {
    // Phase A hoists every signature before any body is entered.
    let (_, diags) = check(
        "fn is_even(n: int) -> bool { if (n == 0) { return true; } return is_odd(n - 1); }\n\
         fn is_odd(n: int) -> bool { if (n == 0) { return false; } return is_even(n - 1); }\n\
         fn make() -> Point { return new Point(1); }\n\
         class Point { pub x: int; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn for_binds_element_type() {
    let (_, diags) = check(
        "fn f(xs: Array<int>) -> int { let mut total = 0; for (x in xs) { let y: int = x; } return total; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn lambda_and_function_type_annotation() {
    let (_, diags) = check(
        "fn f() -> int { let add: fn(int, int) -> int = fn(a: int, b: int) -> int { return a + b; }; return add(1, 2); }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn class_fields_methods_and_this() {
    let (_, diags) = check(
        "class Point {\n\
         pub x: int;\n\
         pub y: int;\n\
         pub fn sum() -> int { return this.x + y; }\n\
         }\n\
         fn f() -> int { let p = new Point(1, 2); return p.sum() + p.x; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn sibling_methods_are_callable_unqualified() {
    let (_, diags) = check(
        "class Counter {\n\
         pub n: int;\n\
         pub fn bump() -> int { return n + 1; }\n\
         pub fn twice() -> int { return bump() + bump(); }\n\
         }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn parent_class_assignability() {
    let (_, diags) = check(
        "class Animal { pub name: string; }\n\
         class Dog : Animal { pub id: int; }\n\
         fn pet(a: Animal) {}\n\
         fn f() { let d = new Dog(7); pet(d); let a: Animal = d; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn stdlib_unqualified_after_import() {
    let (_, diags) = check("using Std.IO;\nfn main() { println(\"hi\"); }");
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn stdlib_qualified_paths() {
    let (_, diags) = check(
        "using Std.Math;\nfn f() -> float { return Std.Math.sqrt(2.0) + Std.Math.PI; }",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn interpolation_placeholders_must_be_in_scope() {
    let (_, diags) = check("fn f() { let x = 1; let s = $\"{x} and {missing}\"; }");
    let errs = errors(&diags);
    assert_eq!(errs.len(), 1, "{diags:?}");
    assert!(errs[0].message.contains("missing"));
    assert!(errs[0].message.contains("interpolation"));
}

#[test]
fn index_into_array() {
    let (_, diags) = check("fn f(xs: Array<string>) -> string { return xs[0]; }");
    assert!(diags.is_empty(), "{diags:?}");

    let (_, diags) = check("fn f(xs: Array<string>) -> string { return xs[\"zero\"]; }");
    assert!(!errors(&diags).is_empty());
}

// ── Type annotation totality ───────────────────────────────────────────

fn walk_exprs<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    out.push(expr);
    match &expr.kind {
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_exprs(lhs, out);
            walk_exprs(rhs, out);
        }
        ExprKind::Unary { operand, .. } => walk_exprs(operand, out),
        ExprKind::Call { callee, args } => {
            walk_exprs(callee, out);
            for arg in args {
                walk_exprs(arg, out);
            }
        }
        ExprKind::Member { object, .. } => walk_exprs(object, out),
        ExprKind::Index { object, index } => {
            walk_exprs(object, out);
            walk_exprs(index, out);
        }
        ExprKind::Lambda { body, .. } => {
            for stmt in body {
                walk_stmt_exprs(stmt, out);
            }
        }
        ExprKind::New { args, .. } => {
            for arg in args {
                walk_exprs(arg, out);
            }
        }
        ExprKind::Some(inner) => walk_exprs(inner, out),
        ExprKind::Array(elements) => {
            for element in elements {
                walk_exprs(element, out);
            }
        }
        _ => {}
    }
}

fn walk_stmt_exprs<'a>(stmt: &'a Stmt, out: &mut Vec<&'a Expr>) {
    match &stmt.kind {
        StmtKind::Let { init, .. } => walk_exprs(init, out),
        StmtKind::Return(Some(expr)) => walk_exprs(expr, out),
        StmtKind::Return(None) | StmtKind::Raw(_) => {}
        StmtKind::Expr(expr) => walk_exprs(expr, out),
        StmtKind::If { cond, then_body, else_body } => {
            walk_exprs(cond, out);
            for s in then_body.iter().chain(else_body) {
                walk_stmt_exprs(s, out);
            }
        }
        StmtKind::While { cond, body } => {
            walk_exprs(cond, out);
            for s in body {
                walk_stmt_exprs(s, out);
            }
        }
        StmtKind::For { iterable, body, .. } => {
            walk_exprs(iterable, out);
            for s in body {
                walk_stmt_exprs(s, out);
            }
        }
        StmtKind::Match { scrutinee, arms } => {
            walk_exprs(scrutinee, out);
            for arm in arms {
                for s in &arm.body {
                    walk_stmt_exprs(s, out);
                }
            }
        }
        StmtKind::Block(stmts) => {
            for s in stmts {
                walk_stmt_exprs(s, out);
            }
        }
    }
}

fn all_exprs(program: &Program) -> Vec<&Expr> {
    let mut out = Vec::new();
    for function in &program.functions {
        for stmt in &function.body {
            walk_stmt_exprs(stmt, &mut out);
        }
    }
    for class in &program.classes {
        for method in &class.methods {
            for stmt in &method.body {
                walk_stmt_exprs(stmt, &mut out);
            }
        }
    }
    out
}

#[test]
fn every_expression_is_typed_after_successful_check() {
    let (registry, diags) = check(
        "using Std.IO;\n\
         class Point { pub x: int; pub fn shifted(d: int) -> int { return x + d; } }\n\
         fn f(o: Option<float>, xs: Array<int>) -> string {\n\
         let p = new Point(1);\n\
         let mut n = 0;\n\
         for (x in xs) { if (x > n) { let m = x; } }\n\
         match o { Some(v) => { let w = v; }, None => {} }\n\
         let g = fn(a: int) -> int { return a * 2; };\n\
         g(p.shifted(3));\n\
         let parts = [\"a\", \"b\"];\n\
         return $\"{n}\" + parts[0] + Std.readLine();\n\
         }",
    );
    assert!(diags.is_empty(), "{diags:?}");
    let module = registry.get("main").unwrap();
    for expr in all_exprs(&module.ast) {
        assert!(
            expr.ty.is_some(),
            "expression at {:?} has no type: {:?}",
            expr.span,
            expr.kind
        );
    }
}
