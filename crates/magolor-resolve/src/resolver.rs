//! File-path to module-name mapping, `using` resolution, and visibility.

use magolor_common::diagnostics::{codes, DiagnosticSink};

use crate::{Module, ModuleRegistry};

/// Convert a file path relative to a package source root into a dotted
/// module name.
///
/// The `src/` prefix and the `.mg` extension are stripped and path
/// separators become dots:
/// `src/api/handlers.mg` -> `"api.handlers"`.
pub fn file_path_to_module_name(filepath: &str) -> String {
    let mut path = filepath;
    if let Some(stripped) = path.strip_prefix("src/") {
        path = stripped;
    } else if let Some(stripped) = path.strip_prefix("src\\") {
        path = stripped;
    }
    if let Some(stripped) = path.strip_suffix(".mg") {
        path = stripped;
    }
    path.replace(['/', '\\'], ".")
}

/// Resolve one `using` path from within `current_module`.
///
/// Resolution order:
/// 1. the literal path, looked up in the registry;
/// 2. the parent package of the current module plus the path (so
///    `api.handlers` importing `types` finds `api.types`);
/// 3. the builtin catalog.
///
/// Returns the resolved dotted path, or `None` if nothing matches.
pub fn resolve_import(
    registry: &ModuleRegistry,
    import_path: &str,
    current_module: &str,
) -> Option<String> {
    if registry.contains(import_path) {
        return Some(import_path.to_string());
    }

    if let Some(last_dot) = current_module.rfind('.') {
        let parent = &current_module[..last_dot];
        let candidate = format!("{parent}.{import_path}");
        if registry.contains(&candidate) {
            return Some(candidate);
        }
    }

    if magolor_stdlib::catalog().is_builtin_module(import_path) {
        return Some(import_path.to_string());
    }

    None
}

/// Resolve every `using` declaration of one registered module, recording
/// the resolved paths on the module and an *unresolved import* diagnostic
/// for each failure. Failures do not abort the pass.
pub fn resolve_imports(registry: &mut ModuleRegistry, module_name: &str, sink: &mut DiagnosticSink) {
    let Some(mut module) = registry.remove(module_name) else {
        return;
    };

    for using in &module.ast.usings {
        let path = using.dotted();
        match resolve_import(registry, &path, &module.name) {
            Some(resolved) => {
                if !module.imports.contains(&resolved) {
                    module.imports.push(resolved);
                }
            }
            None => {
                sink.error(
                    codes::IMPORT_UNRESOLVED,
                    using.path_span,
                    format!("Cannot find module: {path}"),
                );
            }
        }
    }

    registry.register(module);
}

// ── Visibility ─────────────────────────────────────────────────────────

/// Whether a top-level symbol (class or function) of `module` is public.
pub fn is_symbol_public(module: &Module, symbol: &str) -> bool {
    if let Some(class) = module.ast.find_class(symbol) {
        return class.is_public;
    }
    if let Some(function) = module.ast.find_function(symbol) {
        return function.is_public;
    }
    false
}

/// Whether a field or method of a class in `module` is public. Queried
/// separately from the class's own visibility.
pub fn is_member_public(module: &Module, class_name: &str, member: &str) -> bool {
    let Some(class) = module.ast.find_class(class_name) else {
        return false;
    };
    if let Some(field) = class.find_field(member) {
        return field.is_public;
    }
    if let Some(method) = class.find_method(member) {
        return method.is_public;
    }
    false
}

/// Names of every public top-level symbol of `module`.
pub fn public_symbols(module: &Module) -> Vec<&str> {
    let mut symbols = Vec::new();
    for class in &module.ast.classes {
        if class.is_public {
            symbols.push(class.name.as_str());
        }
    }
    for function in &module.ast.functions {
        if function.is_public {
            symbols.push(function.name.as_str());
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use magolor_parser::parse_source;

    fn module_from(name: &str, source: &str) -> Module {
        let mut sink = DiagnosticSink::new(format!("{name}.mg"));
        let ast = parse_source(source, &mut sink);
        assert!(!sink.has_error(), "fixture must parse: {:?}", sink.diagnostics());
        Module::new(name, format!("src/{name}.mg"), ast)
    }

    #[test]
    fn path_to_module_name() {
        assert_eq!(file_path_to_module_name("src/api/handlers.mg"), "api.handlers");
        assert_eq!(file_path_to_module_name("src/main.mg"), "main");
        assert_eq!(file_path_to_module_name("utils.mg"), "utils");
        assert_eq!(file_path_to_module_name("src\\win\\path.mg"), "win.path");
    }

    #[test]
    fn literal_resolution_wins() {
        let mut registry = ModuleRegistry::new();
        registry.register(module_from("types", "class T {}"));
        assert_eq!(
            resolve_import(&registry, "types", "main"),
            Some("types".to_string())
        );
    }

    #[test]
    fn parent_package_fallback() {
        let mut registry = ModuleRegistry::new();
        registry.register(module_from("api.types", "class T {}"));
        // From api.handlers, `using types;` finds api.types.
        assert_eq!(
            resolve_import(&registry, "types", "api.handlers"),
            Some("api.types".to_string())
        );
        // From a top-level module there is no parent to fall back to.
        assert_eq!(resolve_import(&registry, "types", "main"), None);
    }

    #[test]
    fn builtin_modules_resolve() {
        let registry = ModuleRegistry::new();
        assert_eq!(
            resolve_import(&registry, "Std.IO", "main"),
            Some("Std.IO".to_string())
        );
        assert_eq!(resolve_import(&registry, "Std.Nope", "main"), None);
    }

    #[test]
    fn unresolved_import_diagnostic() {
        let mut registry = ModuleRegistry::new();
        let source = "using X.Y;\nfn main() {}";
        registry.register(module_from("main", source));
        let mut sink = DiagnosticSink::new("main.mg");
        resolve_imports(&mut registry, "main", &mut sink);

        assert!(sink.has_error());
        let diag = &sink.diagnostics()[0];
        assert!(diag.message.contains("Cannot find module: X.Y"));
        assert_eq!(diag.code, Some(codes::IMPORT_UNRESOLVED));
        // The range spans exactly `X.Y`.
        assert_eq!(
            &source[diag.span.start as usize..diag.span.end as usize],
            "X.Y"
        );
        // The failed import is not recorded.
        assert!(registry.get("main").unwrap().imports.is_empty());
    }

    #[test]
    fn import_monotonicity() {
        // Adding a module to the registry never reduces the set of
        // successfully-resolved imports.
        let mut registry = ModuleRegistry::new();
        registry.register(module_from("main", "using helpers;\nusing Std.IO;\nfn main() {}"));

        let mut sink = DiagnosticSink::new("main.mg");
        resolve_imports(&mut registry, "main", &mut sink);
        assert!(sink.has_error(), "helpers is not registered yet");
        assert_eq!(registry.get("main").unwrap().imports, vec!["Std.IO"]);

        // Re-register main fresh, add helpers, and resolve again.
        registry.register(module_from("main", "using helpers;\nusing Std.IO;\nfn main() {}"));
        registry.register(module_from("helpers", "pub fn help() {}"));
        let mut sink = DiagnosticSink::new("main.mg");
        resolve_imports(&mut registry, "main", &mut sink);
        assert!(!sink.has_error());
        let imports = &registry.get("main").unwrap().imports;
        assert!(imports.contains(&"helpers".to_string()));
        assert!(imports.contains(&"Std.IO".to_string()));
    }

    #[test]
    fn visibility_queries() {
        let module = module_from(
            "lib",
            "class C { pub x: int; y: int; pub fn m() {} fn hidden() {} }\n\
             priv fn internal() {}\n\
             fn api() {}",
        );
        // Top-level defaults: classes and functions are public, priv opts out.
        assert!(is_symbol_public(&module, "C"));
        assert!(is_symbol_public(&module, "api"));
        assert!(!is_symbol_public(&module, "internal"));
        assert!(!is_symbol_public(&module, "missing"));
        // Members default to private, pub opts in.
        assert!(is_member_public(&module, "C", "x"));
        assert!(!is_member_public(&module, "C", "y"));
        assert!(is_member_public(&module, "C", "m"));
        assert!(!is_member_public(&module, "C", "hidden"));

        let symbols = public_symbols(&module);
        assert!(symbols.contains(&"C"));
        assert!(symbols.contains(&"api"));
        assert!(!symbols.contains(&"internal"));
    }
}
