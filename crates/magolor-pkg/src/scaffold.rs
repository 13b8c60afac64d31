//! Project scaffolding for `magoc init`.
//!
//! Creates the standard Magolor project layout:
//!
//! ```text
//! <name>/
//!   project.toml
//!   src/
//!     main.mg
//! ```

use std::path::Path;

/// Create a new Magolor project with the given name inside `dir`.
///
/// Returns an error if the target directory already exists.
pub fn scaffold_project(name: &str, dir: &Path) -> Result<(), String> {
    let project_dir = dir.join(name);
    if project_dir.exists() {
        return Err(format!("Directory '{}' already exists", name));
    }

    std::fs::create_dir_all(project_dir.join("src"))
        .map_err(|e| format!("Failed to create directory '{}': {}", name, e))?;

    let manifest = format!(
        r#"[project]
name = "{name}"
version = "0.1.0"
authors = []
description = ""
license = "MIT"

[dependencies]
"#
    );
    std::fs::write(project_dir.join("project.toml"), manifest)
        .map_err(|e| format!("Failed to write project.toml: {}", e))?;

    let main_mg = format!(
        "using Std.IO;\n\nfn main() {{\n    Std.print(\"Hello from {name}!\\n\");\n}}\n"
    );
    std::fs::write(project_dir.join("src").join("main.mg"), main_mg)
        .map_err(|e| format!("Failed to write src/main.mg: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use tempfile::TempDir;

    #[test]
    fn scaffold_creates_directory_structure() {
        let tmp = TempDir::new().unwrap();
        scaffold_project("my-app", tmp.path()).unwrap();

        let project_dir = tmp.path().join("my-app");
        assert!(project_dir.is_dir());
        assert!(project_dir.join("project.toml").exists());
        assert!(project_dir.join("src").join("main.mg").exists());
    }

    #[test]
    fn scaffold_manifest_is_valid() {
        let tmp = TempDir::new().unwrap();
        scaffold_project("test-project", tmp.path()).unwrap();

        let content =
            std::fs::read_to_string(tmp.path().join("test-project").join("project.toml")).unwrap();
        let manifest = Manifest::from_str(&content).unwrap();
        assert_eq!(manifest.project.name, "test-project");
        assert_eq!(manifest.project.version, "0.1.0");
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn scaffold_main_compiles_through_the_front_end_shape() {
        let tmp = TempDir::new().unwrap();
        scaffold_project("hello", tmp.path()).unwrap();

        let content =
            std::fs::read_to_string(tmp.path().join("hello").join("src").join("main.mg")).unwrap();
        assert!(content.contains("using Std.IO;"));
        assert!(content.contains("fn main()"));
        assert!(content.contains("Std.print"));
    }

    #[test]
    fn scaffold_refuses_existing_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("taken")).unwrap();
        let err = scaffold_project("taken", tmp.path()).unwrap_err();
        assert!(err.contains("already exists"));
    }
}
