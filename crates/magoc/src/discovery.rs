//! Source file discovery for project builds.

use std::path::{Path, PathBuf};

/// Recursively discover all `.mg` files under `src_dir`.
///
/// Paths come back sorted for determinism, except that `main.mg` is moved
/// to the end so the entry point is compiled after its dependencies.
/// Hidden directories are skipped.
pub fn discover_sources(src_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    walk(src_dir, &mut files)
        .map_err(|e| format!("Failed to walk directory '{}': {}", src_dir.display(), e))?;
    files.sort();
    files.sort_by_key(|path| {
        path.file_name().map(|n| n == "main.mg").unwrap_or(false)
    });
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("mg") {
            files.push(path);
        }
    }
    Ok(())
}
