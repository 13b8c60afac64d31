use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A parsed `project.toml` manifest.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub project: Project,
    /// Dependency name -> versionspec string (`"1.2.3"`, `"*"`,
    /// `"git+https://..."`, `"path:../local"`).
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub build: Option<BuildConfig>,
}

/// Package metadata from the `[project]` section.
#[derive(Debug, Deserialize)]
pub struct Project {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}

/// The `[build]` section.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub optimization: Option<String>,
}

impl Manifest {
    /// Read and parse a manifest from a file path.
    pub fn from_file(path: &Path) -> Result<Manifest, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string.
    pub fn from_str(content: &str) -> Result<Manifest, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse project.toml: {}", e))
    }
}
