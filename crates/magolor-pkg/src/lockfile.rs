use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location of the generated lockfile, relative to the project root.
pub const LOCKFILE_PATH: &str = ".magolor/lock.toml";

/// The contents of `.magolor/lock.toml`.
///
/// The lockfile captures the exact resolved state of all dependencies for
/// deterministic builds. Packages are always sorted by name.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Lockfile {
    pub root: RootPackage,
    #[serde(rename = "package", default)]
    pub packages: Vec<LockedPackage>,
}

/// The `[root]` section: the project the lockfile belongs to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RootPackage {
    pub name: String,
    pub version: String,
}

/// One `[[package]]` entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// Filesystem path the package was resolved to.
    pub location: String,
}

impl Lockfile {
    /// Create a lockfile, sorting packages by name for deterministic output.
    pub fn new(root: RootPackage, mut packages: Vec<LockedPackage>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Lockfile { root, packages }
    }

    /// Serialize the lockfile to a TOML string.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize lockfile: {}", e))
    }

    /// Serialize and write the lockfile, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    /// Read and deserialize a lockfile.
    pub fn read(path: &Path) -> Result<Lockfile, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse lockfile: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> RootPackage {
        RootPackage {
            name: "app".to_string(),
            version: "0.1.0".to_string(),
        }
    }

    #[test]
    fn lockfile_round_trip() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join(LOCKFILE_PATH);

        let lockfile = Lockfile::new(
            root(),
            vec![
                LockedPackage {
                    name: "beta".to_string(),
                    version: "2.0.0".to_string(),
                    location: ".magolor/packages/beta".to_string(),
                },
                LockedPackage {
                    name: "alpha".to_string(),
                    version: "1.0.0".to_string(),
                    location: ".magolor/packages/alpha".to_string(),
                },
            ],
        );

        // Sorted by name regardless of insertion order.
        assert_eq!(lockfile.packages[0].name, "alpha");
        assert_eq!(lockfile.packages[1].name, "beta");

        lockfile.write(&lock_path).unwrap();
        let read_back = Lockfile::read(&lock_path).unwrap();
        assert_eq!(lockfile, read_back);
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = Lockfile::new(
            root(),
            vec![
                LockedPackage { name: "z".into(), version: "1.0.0".into(), location: "/z".into() },
                LockedPackage { name: "a".into(), version: "1.0.0".into(), location: "/a".into() },
            ],
        );
        let b = Lockfile::new(
            root(),
            vec![
                LockedPackage { name: "a".into(), version: "1.0.0".into(), location: "/a".into() },
                LockedPackage { name: "z".into(), version: "1.0.0".into(), location: "/z".into() },
            ],
        );
        assert_eq!(a.to_toml().unwrap(), b.to_toml().unwrap());
    }

    #[test]
    fn sections_have_expected_names() {
        let text = Lockfile::new(
            root(),
            vec![LockedPackage {
                name: "dep".into(),
                version: "0.2.0".into(),
                location: "/dep".into(),
            }],
        )
        .to_toml()
        .unwrap();
        assert!(text.contains("[root]"));
        assert!(text.contains("[[package]]"));
        assert!(text.contains("location = \"/dep\""));
    }

    #[test]
    fn empty_package_list_round_trips() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("lock.toml");
        let lockfile = Lockfile::new(root(), vec![]);
        lockfile.write(&lock_path).unwrap();
        let read_back = Lockfile::read(&lock_path).unwrap();
        assert!(read_back.packages.is_empty());
        assert_eq!(read_back.root.name, "app");
    }
}
