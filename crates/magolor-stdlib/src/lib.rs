//! The Stdlib Descriptor: a static, curated catalog of builtin modules and
//! their exported symbol signatures.
//!
//! This is the single source of truth consumed by the import resolver
//! (builtin module check), the type checker (call typing), the completion
//! engine (labels, kinds, signatures), and the prelude emitter (which
//! modules have C++ counterparts). Symbols whose shape the surface type
//! system cannot express (generic container helpers) carry no `ty`; the
//! checker types calls into them as its synthetic error type so they never
//! cascade.

use std::sync::OnceLock;

use magolor_parser::ast::Type;

/// Completion-relevant classification of a catalog symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdSymbolKind {
    Function,
    Constant,
}

/// One exported builtin symbol.
#[derive(Debug, Clone)]
pub struct StdFn {
    /// Builtin module short name (`"IO"`, `"Math"`, ...); empty string for
    /// the top-level `Std` convenience aliases.
    pub module: &'static str,
    pub name: &'static str,
    /// Human-readable signature shown in completion details and hover.
    pub signature: String,
    pub kind: StdSymbolKind,
    /// Typed signature for the checker, when expressible.
    pub ty: Option<Type>,
}

/// The full builtin catalog.
#[derive(Debug)]
pub struct Catalog {
    modules: Vec<&'static str>,
    fns: Vec<StdFn>,
}

impl Catalog {
    /// Short names of every builtin module (not including the bare `Std`).
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    /// Whether a dotted import path names a builtin module (`Std` or
    /// `Std.<Module>`).
    pub fn is_builtin_module(&self, path: &str) -> bool {
        if path == "Std" {
            return true;
        }
        match path.strip_prefix("Std.") {
            Some(rest) => self.modules.contains(&rest),
            None => false,
        }
    }

    /// Exported symbols of a dotted module path. `"Std"` yields the
    /// top-level aliases; `"Std.IO"` yields the IO module, and so on.
    pub fn module_symbols(&self, path: &str) -> Vec<&StdFn> {
        let module = match path {
            "Std" => "",
            _ => match path.strip_prefix("Std.") {
                Some(rest) => rest,
                None => return Vec::new(),
            },
        };
        self.fns.iter().filter(|f| f.module == module).collect()
    }

    /// Look up one symbol by dotted module path and name.
    pub fn lookup(&self, path: &str, name: &str) -> Option<&StdFn> {
        self.module_symbols(path).into_iter().find(|f| f.name == name)
    }

    /// Every symbol in the catalog.
    pub fn all(&self) -> &[StdFn] {
        &self.fns
    }
}

/// Access the process-wide catalog. Built once, on first use.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(build)
}

// ── Construction ───────────────────────────────────────────────────────

fn func(module: &'static str, name: &'static str, params: &[Type], ret: Type) -> StdFn {
    let rendered: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    let signature = format!("fn {name}({}) -> {ret}", rendered.join(", "));
    StdFn {
        module,
        name,
        signature,
        kind: StdSymbolKind::Function,
        ty: Some(Type::Function {
            params: params.to_vec(),
            ret: Box::new(ret),
        }),
    }
}

/// A symbol whose type is not expressible in the surface language.
fn generic(module: &'static str, name: &'static str, signature: &'static str) -> StdFn {
    StdFn {
        module,
        name,
        signature: signature.to_string(),
        kind: StdSymbolKind::Function,
        ty: None,
    }
}

fn constant(module: &'static str, name: &'static str, ty: Type) -> StdFn {
    StdFn {
        module,
        name,
        signature: format!("{name}: {ty}"),
        kind: StdSymbolKind::Constant,
        ty: Some(ty),
    }
}

fn opt(inner: Type) -> Type {
    Type::Option(Box::new(inner))
}

fn arr(elem: Type) -> Type {
    Type::Array(Box::new(elem))
}

fn build() -> Catalog {
    use Type::{Bool, Float, Int, String as Str, Void};

    let mut fns = Vec::new();

    // Top-level `Std` convenience aliases, mirroring the emitted prelude.
    fns.push(func("", "print", &[Str], Void));
    fns.push(func("", "println", &[Str], Void));
    fns.push(func("", "readLine", &[], Str));
    fns.push(func("", "parseInt", &[Str], opt(Int)));
    fns.push(func("", "parseFloat", &[Str], opt(Float)));

    // Std.IO
    fns.push(func("IO", "print", &[Str], Void));
    fns.push(func("IO", "println", &[Str], Void));
    fns.push(func("IO", "eprint", &[Str], Void));
    fns.push(func("IO", "eprintln", &[Str], Void));
    fns.push(func("IO", "readLine", &[], Str));
    fns.push(func("IO", "read", &[], Str));
    fns.push(func("IO", "readChar", &[], Str));
    fns.push(func("IO", "readFile", &[Str], opt(Str)));
    fns.push(func("IO", "writeFile", &[Str, Str], Bool));
    fns.push(func("IO", "appendFile", &[Str, Str], Bool));

    // Std.Parse
    fns.push(func("Parse", "parseInt", &[Str], opt(Int)));
    fns.push(func("Parse", "parseFloat", &[Str], opt(Float)));
    fns.push(func("Parse", "parseBool", &[Str], opt(Bool)));

    // Std.Option -- generic helpers over Option<T>.
    fns.push(generic("Option", "isSome", "fn isSome(Option<T>) -> bool"));
    fns.push(generic("Option", "isNone", "fn isNone(Option<T>) -> bool"));
    fns.push(generic("Option", "unwrap", "fn unwrap(Option<T>) -> T"));
    fns.push(generic("Option", "unwrapOr", "fn unwrapOr(Option<T>, T) -> T"));

    // Std.Math
    fns.push(constant("Math", "PI", Float));
    fns.push(constant("Math", "E", Float));
    for name in [
        "sqrt", "cbrt", "sin", "cos", "tan", "asin", "acos", "atan", "exp", "log", "log10",
        "log2", "floor", "ceil", "round", "abs",
    ] {
        fns.push(func("Math", name, &[Float], Float));
    }
    fns.push(func("Math", "atan2", &[Float, Float], Float));
    fns.push(func("Math", "pow", &[Float, Float], Float));
    fns.push(func("Math", "min", &[Float, Float], Float));
    fns.push(func("Math", "max", &[Float, Float], Float));
    fns.push(func("Math", "clamp", &[Float, Float, Float], Float));

    // Std.String
    fns.push(func("String", "length", &[Str], Int));
    fns.push(func("String", "isEmpty", &[Str], Bool));
    fns.push(func("String", "trim", &[Str], Str));
    fns.push(func("String", "toLower", &[Str], Str));
    fns.push(func("String", "toUpper", &[Str], Str));
    fns.push(func("String", "startsWith", &[Str, Str], Bool));
    fns.push(func("String", "endsWith", &[Str, Str], Bool));
    fns.push(func("String", "contains", &[Str, Str], Bool));
    fns.push(func("String", "replace", &[Str, Str, Str], Str));
    fns.push(func("String", "split", &[Str, Str], arr(Str)));
    fns.push(func("String", "join", &[arr(Str), Str], Str));
    fns.push(func("String", "repeat", &[Str, Int], Str));
    fns.push(func("String", "substring", &[Str, Int, Int], Str));

    // Std.Array -- generic over the element type.
    fns.push(generic("Array", "length", "fn length(Array<T>) -> int"));
    fns.push(generic("Array", "isEmpty", "fn isEmpty(Array<T>) -> bool"));
    fns.push(generic("Array", "push", "fn push(Array<T>, T) -> void"));
    fns.push(generic("Array", "pop", "fn pop(Array<T>) -> Option<T>"));
    fns.push(generic("Array", "contains", "fn contains(Array<T>, T) -> bool"));
    fns.push(generic("Array", "reverse", "fn reverse(Array<T>) -> void"));
    fns.push(generic("Array", "sort", "fn sort(Array<T>) -> void"));
    fns.push(generic("Array", "indexOf", "fn indexOf(Array<T>, T) -> int"));
    fns.push(generic("Array", "clear", "fn clear(Array<T>) -> void"));

    // Std.Map / Std.Set -- completion only; no expressible surface type.
    for name in [
        "create", "insert", "get", "getOr", "contains", "remove", "size", "isEmpty", "clear",
        "keys", "values",
    ] {
        fns.push(generic("Map", name, "fn (Map<K, V>)"));
    }
    for name in [
        "create", "insert", "contains", "remove", "size", "isEmpty", "clear", "toArray",
        "union_", "intersection", "difference",
    ] {
        fns.push(generic("Set", name, "fn (Set<T>)"));
    }

    // Std.File
    fns.push(func("File", "exists", &[Str], Bool));
    fns.push(func("File", "isFile", &[Str], Bool));
    fns.push(func("File", "isDirectory", &[Str], Bool));
    fns.push(func("File", "createDir", &[Str], Bool));
    fns.push(func("File", "remove", &[Str], Bool));
    fns.push(func("File", "removeAll", &[Str], Bool));
    fns.push(func("File", "copy", &[Str, Str], Bool));
    fns.push(func("File", "rename", &[Str, Str], Bool));
    fns.push(func("File", "size", &[Str], Int));

    // Std.Time
    fns.push(func("Time", "now", &[], Float));
    fns.push(func("Time", "sleep", &[Int], Void));
    fns.push(func("Time", "timestamp", &[], Int));

    // Std.Random
    fns.push(func("Random", "randInt", &[Int, Int], Int));
    fns.push(func("Random", "randFloat", &[], Float));
    fns.push(func("Random", "randBool", &[], Bool));

    // Std.System
    fns.push(func("System", "exit", &[Int], Void));
    fns.push(func("System", "getEnv", &[Str], opt(Str)));
    fns.push(func("System", "execute", &[Str], Int));

    Catalog {
        modules: vec![
            "IO", "Parse", "Option", "Math", "String", "Array", "Map", "Set", "File", "Time",
            "Random", "System",
        ],
        fns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_module_paths() {
        let cat = catalog();
        assert!(cat.is_builtin_module("Std"));
        assert!(cat.is_builtin_module("Std.IO"));
        assert!(cat.is_builtin_module("Std.Math"));
        assert!(!cat.is_builtin_module("Std.Nope"));
        assert!(!cat.is_builtin_module("IO"));
        assert!(!cat.is_builtin_module("MyApp.Utils"));
    }

    #[test]
    fn lookup_typed_function() {
        let cat = catalog();
        let print = cat.lookup("Std.IO", "print").expect("Std.IO.print exists");
        assert_eq!(print.kind, StdSymbolKind::Function);
        assert_eq!(
            print.ty,
            Some(Type::Function {
                params: vec![Type::String],
                ret: Box::new(Type::Void)
            })
        );
        assert_eq!(print.signature, "fn print(string) -> void");
    }

    #[test]
    fn top_level_std_aliases() {
        let cat = catalog();
        let names: Vec<&str> = cat.module_symbols("Std").iter().map(|f| f.name).collect();
        assert!(names.contains(&"print"));
        assert!(names.contains(&"println"));
        assert!(names.contains(&"parseInt"));
        let parse_int = cat.lookup("Std", "parseInt").unwrap();
        assert_eq!(
            parse_int.ty,
            Some(Type::Function {
                params: vec![Type::String],
                ret: Box::new(Type::Option(Box::new(Type::Int)))
            })
        );
    }

    #[test]
    fn constants_have_constant_kind() {
        let cat = catalog();
        let pi = cat.lookup("Std.Math", "PI").unwrap();
        assert_eq!(pi.kind, StdSymbolKind::Constant);
        assert_eq!(pi.ty, Some(Type::Float));
    }

    #[test]
    fn generic_helpers_are_untyped() {
        let cat = catalog();
        assert!(cat.lookup("Std.Option", "unwrap").unwrap().ty.is_none());
        assert!(cat.lookup("Std.Array", "push").unwrap().ty.is_none());
        assert!(cat.lookup("Std.Map", "insert").unwrap().ty.is_none());
    }

    #[test]
    fn every_module_exports_something() {
        let cat = catalog();
        for module in cat.modules() {
            let path = format!("Std.{module}");
            assert!(
                !cat.module_symbols(&path).is_empty(),
                "module {path} has no symbols"
            );
        }
    }
}
