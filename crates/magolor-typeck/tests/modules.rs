//! Cross-module checking: imports, visibility, and private leakage.

use magolor_common::diagnostics::{codes, Diagnostic, DiagnosticSink, Severity};
use magolor_parser::parse_source;
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_typeck::check_registered;

/// Register several `(name, source)` modules, resolve imports everywhere,
/// then check `target`, returning its diagnostics.
fn check_multi(modules: &[(&str, &str)], target: &str) -> Vec<Diagnostic> {
    let mut registry = ModuleRegistry::new();
    for (name, source) in modules {
        let mut sink = DiagnosticSink::new(format!("src/{name}.mg"));
        let ast = parse_source(source, &mut sink);
        assert!(!sink.has_error(), "fixture `{name}` must parse: {:?}", sink.diagnostics());
        registry.register(Module::new(*name, format!("src/{name}.mg"), ast));
    }
    let names: Vec<String> = registry.names().map(str::to_string).collect();
    for name in names {
        let mut sink = DiagnosticSink::new(format!("src/{name}.mg"));
        resolver::resolve_imports(&mut registry, &name, &mut sink);
        assert!(!sink.has_error(), "imports of `{name}` must resolve: {:?}", sink.diagnostics());
    }
    let mut sink = DiagnosticSink::new(format!("src/{target}.mg"));
    check_registered(&mut registry, target, &mut sink);
    sink.into_sorted()
}

fn errors(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
    diags.iter().filter(|d| d.severity == Severity::Error).collect()
}

#[test]
fn imported_public_function_is_callable_unqualified() {
    let diags = check_multi(
        &[
            ("helpers", "fn double(x: int) -> int { return x * 2; }"),
            ("main", "using helpers;\nfn main() { let y = double(21); }"),
        ],
        "main",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn imported_public_function_is_callable_qualified() {
    let diags = check_multi(
        &[
            ("helpers", "fn double(x: int) -> int { return x * 2; }"),
            ("main", "using helpers;\nfn main() { let y = helpers.double(21); }"),
        ],
        "main",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn private_function_invisible_across_modules() {
    let diags = check_multi(
        &[
            ("helpers", "priv fn secret() {}"),
            ("main", "using helpers;\nfn main() { helpers.secret(); }"),
        ],
        "main",
    );
    let errs = errors(&diags);
    assert_eq!(errs.len(), 1, "{diags:?}");
    assert_eq!(errs[0].code, Some(codes::IMPORT_PRIVATE_SYMBOL));
    assert!(errs[0].message.contains("private symbol `secret`"));
}

#[test]
fn private_method_leak_is_rejected() {
    // Scenario S3: module A declares a private method inside class C;
    // module B constructs C and calls it. Exactly one type error about
    // private member access.
    let diags = check_multi(
        &[
            ("a", "class C { fn helper() {} }"),
            ("b", "using a;\nfn main() { C().helper(); }"),
        ],
        "b",
    );
    let errs = errors(&diags);
    assert_eq!(errs.len(), 1, "{diags:?}");
    assert_eq!(errs[0].code, Some(codes::TYPE_PRIVATE_MEMBER));
    assert!(errs[0].message.contains("private member `helper`"));
    assert!(errs[0].message.contains("class `C`"));
}

#[test]
fn public_members_of_imported_class_are_visible() {
    let diags = check_multi(
        &[
            ("shapes", "class Rect { pub w: int; pub h: int; pub fn area() -> int { return w * h; } }"),
            ("main", "using shapes;\nfn main() -> int { let r = new Rect(2, 3); return r.area() + r.w; }"),
        ],
        "main",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn private_field_of_imported_class_is_rejected() {
    let diags = check_multi(
        &[
            ("shapes", "class Rect { w: int; pub fn width() -> int { return w; } }"),
            ("main", "using shapes;\nfn main() -> int { let r = new Rect(2); return r.w; }"),
        ],
        "main",
    );
    let errs = errors(&diags);
    assert_eq!(errs.len(), 1, "{diags:?}");
    assert_eq!(errs[0].code, Some(codes::TYPE_PRIVATE_MEMBER));
}

#[test]
fn unused_module_import_warns() {
    let diags = check_multi(
        &[
            ("helpers", "fn double(x: int) -> int { return x * 2; }"),
            ("main", "using helpers;\nfn main() {}"),
        ],
        "main",
    );
    let warning = diags
        .iter()
        .find(|d| d.code == Some(codes::WARN_UNUSED_IMPORT))
        .expect("expected an unused-import warning");
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains("helpers"));
}

#[test]
fn used_module_import_does_not_warn() {
    let diags = check_multi(
        &[
            ("helpers", "fn double(x: int) -> int { return x * 2; }"),
            ("main", "using helpers;\nfn main() { double(1); }"),
        ],
        "main",
    );
    assert!(
        diags.iter().all(|d| d.code != Some(codes::WARN_UNUSED_IMPORT)),
        "{diags:?}"
    );
}

#[test]
fn parent_package_fallback_import_checks() {
    let diags = check_multi(
        &[
            ("api.types", "class Request { pub path: string; }"),
            (
                "api.handlers",
                "using types;\nfn handle() -> string { let r = new Request(\"/\"); return r.path; }",
            ),
        ],
        "api.handlers",
    );
    assert!(diags.is_empty(), "{diags:?}");
}
