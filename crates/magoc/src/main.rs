//! The Magolor compiler driver.
//!
//! Subcommands cover the whole toolchain surface: building a file or a
//! `project.toml` project to a native executable (through the host C++
//! compiler), emitting the generated C++, checking without building,
//! running, scaffolding, and launching the language server.
//!
//! Exit codes: 0 on success, 1 on any Error-severity diagnostic, 2 on I/O
//! or invocation failure.

mod discovery;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use magolor_pkg::{LockedPackage, Lockfile, Manifest, RootPackage, SourceSpec, LOCKFILE_PATH};
use pipeline::CompileOutcome;

#[derive(Parser)]
#[command(name = "magoc", version, about = "The Magolor compiler")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a source file, or the current project when no file is given
    Build {
        file: Option<PathBuf>,
        /// Output executable name
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Show detailed compilation steps
        #[arg(long)]
        verbose: bool,
    },
    /// Output the generated C++ code for a source file
    Emit { file: PathBuf },
    /// Check for errors without building
    Check { file: PathBuf },
    /// Re-indent a source file in place
    Fmt { file: PathBuf },
    /// Compile and run immediately
    Run { file: PathBuf },
    /// Initialize a new Magolor project
    Init { name: String },
    /// Launch the language server on standard streams
    Lsp,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Cmd::Build { file, output, verbose } => match file {
            Some(file) => build_file(&file, output.as_deref(), verbose, false),
            None => build_project(verbose),
        },
        Cmd::Emit { file } => emit(&file),
        Cmd::Check { file } => check(&file),
        Cmd::Fmt { file } => fmt(&file),
        Cmd::Run { file } => build_file(&file, None, false, true),
        Cmd::Init { name } => init(&name),
        Cmd::Lsp => match magolor_lsp::run_stdio() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: language server failed: {e}");
                2
            }
        },
    };
    ExitCode::from(code)
}

/// Run the front-end over a file list; I/O problems exit with code 2
/// before any diagnostics print.
fn compile_inputs(files: &[PathBuf], package: &str) -> Result<CompileOutcome, String> {
    let units = pipeline::load_sources(files)?;
    Ok(pipeline::run_front_end(&units, package))
}

fn report_outcome(outcome: &CompileOutcome) {
    report::print_diagnostics(&outcome.diagnostics, &outcome.sources);
}

fn emit(file: &PathBuf) -> u8 {
    let outcome = match compile_inputs(std::slice::from_ref(file), "") {
        Ok(outcome) => outcome,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    report_outcome(&outcome);
    let Some(program) = &outcome.program else {
        return 1;
    };
    print!("{}", magolor_codegen::generate(program));
    0
}

fn check(file: &PathBuf) -> u8 {
    let outcome = match compile_inputs(std::slice::from_ref(file), "") {
        Ok(outcome) => outcome,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    report_outcome(&outcome);
    if outcome.has_errors() {
        return 1;
    }
    println!("    Checking {}", file.display());
    println!("    Finished no errors found");
    0
}

fn fmt(file: &PathBuf) -> u8 {
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error: Cannot open file: {}: {e}", file.display());
            return 2;
        }
    };
    let formatted = magolor_fmt::format_source(&content);
    if formatted == content {
        return 0;
    }
    if let Err(e) = std::fs::write(file, formatted) {
        eprintln!("error: Cannot write file: {}: {e}", file.display());
        return 2;
    }
    println!("   Formatted {}", file.display());
    0
}

fn build_file(file: &PathBuf, output: Option<&Path>, verbose: bool, run_after: bool) -> u8 {
    if verbose {
        println!("   Compiling {}", file.display());
    }
    let outcome = match compile_inputs(std::slice::from_ref(file), "") {
        Ok(outcome) => outcome,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    report_outcome(&outcome);
    let Some(program) = &outcome.program else {
        return 1;
    };

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let exe_path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&stem));
    let cpp_path = PathBuf::from(format!("{stem}.cpp"));

    let cpp = magolor_codegen::generate(program);
    if let Err(e) = std::fs::write(&cpp_path, cpp) {
        eprintln!("error: Cannot write file: {}: {e}", cpp_path.display());
        return 2;
    }

    let code = invoke_cxx(&cpp_path, &exe_path, "2", verbose);
    let _ = std::fs::remove_file(&cpp_path);
    if code != 0 {
        return code;
    }

    if run_after {
        let status = std::process::Command::new(
            // Relative paths need an explicit ./ prefix to execute.
            if exe_path.components().count() == 1 {
                PathBuf::from(format!("./{}", exe_path.display()))
            } else {
                exe_path.clone()
            },
        )
        .status();
        let _ = std::fs::remove_file(&exe_path);
        return match status {
            Ok(status) => status.code().unwrap_or(1).clamp(0, 255) as u8,
            Err(e) => {
                eprintln!("error: failed to run {}: {e}", exe_path.display());
                2
            }
        };
    }

    println!("    Finished {}", exe_path.display());
    0
}

fn build_project(verbose: bool) -> u8 {
    let manifest = match Manifest::from_file(Path::new("project.toml")) {
        Ok(manifest) => manifest,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("  = help: initialize a project with `magoc init <name>`");
            return 2;
        }
    };
    if verbose {
        println!(
            "    Building {} v{}",
            manifest.project.name, manifest.project.version
        );
    }

    let mut files = match discovery::discover_sources(Path::new("src")) {
        Ok(files) => files,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    if files.is_empty() {
        eprintln!("error: no source files found");
        eprintln!("  = help: add .mg files to the src/ directory");
        return 2;
    }

    // Local path dependencies join the build; everything else is recorded
    // but not fetched.
    let mut locked = Vec::new();
    for (name, spec) in &manifest.dependencies {
        match SourceSpec::parse(spec) {
            Ok(SourceSpec::Path(path)) => {
                let dep_src = Path::new(&path).join("src");
                match discovery::discover_sources(&dep_src) {
                    Ok(dep_files) => files.extend(dep_files),
                    Err(message) => {
                        eprintln!("error: dependency `{name}`: {message}");
                        return 2;
                    }
                }
                let version = Manifest::from_file(&Path::new(&path).join("project.toml"))
                    .map(|m| m.project.version)
                    .unwrap_or_else(|_| "0.0.0".to_string());
                locked.push(LockedPackage {
                    name: name.clone(),
                    version,
                    location: path,
                });
            }
            Ok(other) => {
                eprintln!("warning: dependency `{name}` ({other}) requires fetching and was skipped");
            }
            Err(message) => {
                eprintln!("error: dependency `{name}`: {message}");
                return 2;
            }
        }
    }

    let outcome = match compile_inputs(&files, &manifest.project.name) {
        Ok(outcome) => outcome,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    report_outcome(&outcome);
    let Some(program) = &outcome.program else {
        return 1;
    };

    let lockfile = Lockfile::new(
        RootPackage {
            name: manifest.project.name.clone(),
            version: manifest.project.version.clone(),
        },
        locked,
    );
    if let Err(message) = lockfile.write(Path::new(LOCKFILE_PATH)) {
        eprintln!("error: {message}");
        return 2;
    }

    if let Err(e) = std::fs::create_dir_all("target") {
        eprintln!("error: Cannot create target directory: {e}");
        return 2;
    }
    let cpp_path = PathBuf::from(format!("target/{}.cpp", manifest.project.name));
    let exe_path = PathBuf::from(format!("target/{}", manifest.project.name));
    let cpp = magolor_codegen::generate(program);
    if let Err(e) = std::fs::write(&cpp_path, cpp) {
        eprintln!("error: Cannot write file: {}: {e}", cpp_path.display());
        return 2;
    }

    let optimization = manifest
        .build
        .as_ref()
        .and_then(|b| b.optimization.clone())
        .unwrap_or_else(|| "2".to_string());
    let code = invoke_cxx(&cpp_path, &exe_path, &optimization, verbose);
    let _ = std::fs::remove_file(&cpp_path);
    if code != 0 {
        return code;
    }

    println!("    Finished release target(s)");
    println!("    Binary: {}", exe_path.display());
    0
}

/// Spawn the host C++ compiler; blocks until completion.
fn invoke_cxx(cpp_path: &Path, exe_path: &Path, optimization: &str, verbose: bool) -> u8 {
    if verbose {
        println!("   Compiling C++ code");
    }
    let output = std::process::Command::new("g++")
        .arg("-std=c++17")
        .arg(format!("-O{optimization}"))
        .arg("-o")
        .arg(exe_path)
        .arg(cpp_path)
        .output();
    match output {
        Err(e) => {
            eprintln!("error: failed to run g++: {e}");
            2
        }
        Ok(output) if !output.status.success() => {
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
            eprintln!("error: C++ compilation failed");
            1
        }
        Ok(_) => 0,
    }
}

fn init(name: &str) -> u8 {
    match magolor_pkg::scaffold_project(name, Path::new(".")) {
        Ok(()) => {
            println!("     Created project `{name}`");
            println!("  = help: cd {name} && magoc build");
            0
        }
        Err(message) => {
            eprintln!("error: {message}");
            2
        }
    }
}
