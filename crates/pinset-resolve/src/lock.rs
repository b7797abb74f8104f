//! Flat lock output of a resolution

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use pinset_version::Version;
use serde::{Deserialize, Serialize};

use crate::index::InMemoryIndex;
use crate::package::{PackageName, Source};
use crate::resolver::ResolutionResult;
use crate::{Error, Result};

/// One pinned package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub extras: BTreeSet<String>,
}

/// The persisted result of a resolution, sorted by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub packages: Vec<LockedPackage>,
}

impl Lock {
    /// Flatten a resolution. Extras identifiers fold into their base
    /// package and the environment is left out.
    pub fn from_result(result: &ResolutionResult) -> Self {
        let mut packages: BTreeMap<PackageName, LockedPackage> = BTreeMap::new();
        for candidate in result.mapping().values() {
            let dist = match candidate.distribution() {
                Some(dist) => dist,
                None => continue,
            };
            let entry = packages
                .entry(dist.name().clone())
                .or_insert_with(|| LockedPackage {
                    name: dist.name().to_string(),
                    version: dist.version().to_string(),
                    source: dist.source().clone(),
                    extras: BTreeSet::new(),
                });
            if let Some(extras) = candidate.extras() {
                entry.extras.extend(extras.iter().cloned());
            }
        }

        Self {
            packages: packages.into_values().collect(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn find_package(&self, name: &str) -> Option<&LockedPackage> {
        let name = PackageName::new(name);
        self.packages
            .iter()
            .find(|p| PackageName::new(&p.name) == name)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// A copy of `index` with every locked package registered as installed.
    ///
    /// Resolving again against it with installed distributions preferred
    /// reproduces the lock as long as it still satisfies the request.
    pub fn installed_index(&self, index: &InMemoryIndex) -> Result<InMemoryIndex> {
        let mut installed = index.clone();
        for package in &self.packages {
            let name = PackageName::new(&package.name);
            let version = Version::parse(&package.version)?;
            let dist = index
                .find(&name, &version, &package.source)
                .ok_or_else(|| Error::PackageNotFound {
                    name: format!("{} {}", package.name, package.version),
                })?;
            installed.set_installed(dist);
        }
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let lock = Lock {
            packages: vec![LockedPackage {
                name: "a".into(),
                version: "1.0".into(),
                source: Source::Index("default".into()),
                extras: ["x".to_string()].into(),
            }],
        };
        let json = lock.to_json().unwrap();
        assert!(json.contains(r#""type": "index""#));
        assert!(json.contains(r#""extras": ["#));

        let parsed = Lock::from_json(&json).unwrap();
        assert_eq!(parsed, lock);
        assert!(parsed.find_package("A").is_some());
    }

    #[test]
    fn test_installed_index_unknown_package() {
        let lock = Lock {
            packages: vec![LockedPackage {
                name: "ghost".into(),
                version: "1.0".into(),
                source: Source::default(),
                extras: BTreeSet::new(),
            }],
        };
        assert!(matches!(
            lock.installed_index(&InMemoryIndex::new()),
            Err(Error::PackageNotFound { .. })
        ));
    }
}
