//! The build pipeline: lex, parse, register, resolve, check, merge.

use std::path::PathBuf;

use magolor_common::diagnostics::{Diagnostic, DiagnosticSink, Severity};
use magolor_common::source_map::SourceMap;
use magolor_parser::ast::Program;
use magolor_parser::parse_source;
use magolor_resolve::{resolver, Module, ModuleRegistry};
use magolor_typeck::check_registered;

/// One source file queued for compilation.
#[derive(Debug)]
pub struct SourceUnit {
    pub path: String,
    pub text: String,
}

/// Everything the front-end produced for one build.
pub struct CompileOutcome {
    /// The merged, checked program. `None` when any Error-severity
    /// diagnostic was recorded -- code generation is skipped entirely.
    pub program: Option<Program>,
    pub diagnostics: Vec<Diagnostic>,
    pub sources: SourceMap,
}

impl CompileOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Read source files from disk into units. I/O failures are invocation
/// errors, not diagnostics.
pub fn load_sources(files: &[PathBuf]) -> Result<Vec<SourceUnit>, String> {
    let mut units = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(file)
            .map_err(|e| format!("Cannot open file: {}: {}", file.display(), e))?;
        units.push(SourceUnit {
            path: file.to_string_lossy().replace('\\', "/"),
            text,
        });
    }
    Ok(units)
}

/// Run the full front-end over a set of units.
///
/// The registry is created fresh for the build. Every unit is parsed and
/// registered before any import resolves, and every import resolves before
/// any body checks, so declaration order between files never matters.
pub fn run_front_end(units: &[SourceUnit], package: &str) -> CompileOutcome {
    let mut sources = SourceMap::new();
    let mut registry = ModuleRegistry::new();
    let mut diagnostics = Vec::new();
    let mut module_names = Vec::new();

    // Phase 1: parse and register.
    for unit in units {
        sources.add(&unit.path, &unit.text);
        let mut sink = DiagnosticSink::new(&unit.path);
        let ast = parse_source(&unit.text, &mut sink);
        let name = resolver::file_path_to_module_name(&unit.path);
        let mut module = Module::new(name.clone(), &unit.path, ast);
        module.package = package.to_string();
        registry.register(module);
        module_names.push(name);
        diagnostics.extend(sink.into_sorted());
    }

    let parse_failed = diagnostics.iter().any(|d| d.severity == Severity::Error);

    // Phase 2: connect imports.
    if !parse_failed {
        for name in &module_names {
            let file = registry
                .get(name)
                .map(|m| m.filepath.clone())
                .unwrap_or_default();
            let mut sink = DiagnosticSink::new(file);
            resolver::resolve_imports(&mut registry, name, &mut sink);
            diagnostics.extend(sink.into_sorted());
        }
    }

    // Phase 3: annotate. Dependent lookups would only cascade off earlier
    // failures, so checking waits for a clean graph.
    let import_failed = diagnostics.iter().any(|d| d.severity == Severity::Error);
    if !import_failed {
        for name in &module_names {
            let file = registry
                .get(name)
                .map(|m| m.filepath.clone())
                .unwrap_or_default();
            let mut sink = DiagnosticSink::new(file);
            check_registered(&mut registry, name, &mut sink);
            diagnostics.extend(sink.into_sorted());
        }
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let program = if has_errors {
        None
    } else {
        let programs: Vec<Program> = module_names
            .iter()
            .filter_map(|name| registry.remove(name))
            .map(|module| module.ast)
            .collect();
        Some(merge_programs(programs))
    };

    CompileOutcome {
        program,
        diagnostics,
        sources,
    }
}

/// Concatenate per-file programs into one unit for emission.
pub fn merge_programs(programs: Vec<Program>) -> Program {
    let mut merged = Program::default();
    for program in programs {
        merged.usings.extend(program.usings);
        merged.cimports.extend(program.cimports);
        merged.classes.extend(program.classes);
        merged.functions.extend(program.functions);
    }
    merged
}
