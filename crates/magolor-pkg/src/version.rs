//! Dependency versionspec parsing and satisfaction.

use std::fmt;

use semver::Version;

/// A classified dependency source.
///
/// - `"x.y.z"`  -> [`SourceSpec::Version`]: registry dependency; satisfied
///   by the same major and minor with patch greater or equal.
/// - `"*"`      -> [`SourceSpec::Any`]: any version.
/// - `"git+URL"`-> [`SourceSpec::Git`]: git source (recorded, not fetched).
/// - `"path:p"` -> [`SourceSpec::Path`]: local path source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Version(Version),
    Any,
    Git(String),
    Path(String),
}

impl SourceSpec {
    /// Parse a versionspec string from a manifest.
    pub fn parse(spec: &str) -> Result<SourceSpec, String> {
        if spec == "*" {
            return Ok(SourceSpec::Any);
        }
        if let Some(url) = spec.strip_prefix("git+") {
            if url.is_empty() {
                return Err("git source is missing a URL".to_string());
            }
            return Ok(SourceSpec::Git(url.to_string()));
        }
        if let Some(path) = spec.strip_prefix("path:") {
            if path.is_empty() {
                return Err("path source is missing a path".to_string());
            }
            return Ok(SourceSpec::Path(path.to_string()));
        }
        Version::parse(spec)
            .map(SourceSpec::Version)
            .map_err(|e| format!("invalid versionspec `{spec}`: {e}"))
    }

    /// Whether an installed version satisfies this spec. Git and path
    /// sources are pinned by location, so any version satisfies them.
    pub fn satisfied_by(&self, installed: &Version) -> bool {
        match self {
            SourceSpec::Version(required) => {
                installed.major == required.major
                    && installed.minor == required.minor
                    && installed.patch >= required.patch
            }
            SourceSpec::Any | SourceSpec::Git(_) | SourceSpec::Path(_) => true,
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Version(v) => write!(f, "{v}"),
            SourceSpec::Any => write!(f, "*"),
            SourceSpec::Git(url) => write!(f, "git+{url}"),
            SourceSpec::Path(path) => write!(f, "path:{path}"),
        }
    }
}
