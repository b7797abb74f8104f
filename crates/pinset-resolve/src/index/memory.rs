use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use pinset_version::Version;
use serde::{Deserialize, Serialize};

use super::PackageIndex;
use crate::package::{Distribution, PackageName, Source};
use crate::{Error, Result};

/// One entry of an index document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_environment: Option<String>,
    /// Direct reference location; such records are only reachable by URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub installed: bool,
}

/// JSON document accepted by [`InMemoryIndex::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default = "default_index_name")]
    pub index: String,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
}

fn default_index_name() -> String {
    "default".to_string()
}

impl PackageRecord {
    fn into_distribution(self, index: &str) -> Result<Distribution> {
        let version = Version::parse(&self.version).map_err(|e| Error::InvalidMetadata {
            package: self.name.clone(),
            reason: e.to_string(),
        })?;

        let source = match &self.url {
            Some(url) => url_source(url),
            None if self.installed => Source::Installed,
            None => Source::Index(index.to_string()),
        };

        let mut dist = Distribution::new(self.name.as_str(), version)
            .with_source(source)
            .with_requires(self.requires);
        for (extra, requires) in self.extras {
            dist = dist.with_extra(&extra, requires);
        }
        if let Some(spec) = self.requires_environment {
            dist = dist.with_requires_environment(spec);
        }
        Ok(dist)
    }
}

fn url_source(url: &str) -> Source {
    match url.strip_prefix("file://") {
        Some(path) => Source::Path(PathBuf::from(path)),
        None => Source::Url(url.to_string()),
    }
}

/// An index held entirely in memory.
///
/// Distributions keep their insertion order; ranking is the provider's job.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    packages: IndexMap<PackageName, Vec<Arc<Distribution>>>,
    installed: IndexMap<PackageName, Arc<Distribution>>,
    urls: IndexMap<String, Arc<Distribution>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a JSON document.
    pub fn from_json(content: &str) -> Result<Self> {
        let document: IndexDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    /// Load an index from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_document(document: IndexDocument) -> Result<Self> {
        let mut index = Self::new();
        for record in document.packages {
            let url = record.url.clone();
            let installed = record.installed;
            let dist = record.into_distribution(&document.index)?;
            match url {
                Some(url) => {
                    index.add_url(url, dist);
                }
                None if installed => {
                    index.add_installed(dist);
                }
                None => {
                    index.add(dist);
                }
            }
        }
        log::debug!(
            "Loaded index \"{}\": {} packages, {} installed, {} direct references",
            document.index,
            index.packages.len(),
            index.installed.len(),
            index.urls.len()
        );
        Ok(index)
    }

    /// Add an installable distribution.
    pub fn add(&mut self, dist: Distribution) -> &mut Self {
        self.add_arc(Arc::new(dist))
    }

    fn add_arc(&mut self, dist: Arc<Distribution>) -> &mut Self {
        let versions = self.packages.entry(dist.name().clone()).or_default();
        if !versions.contains(&dist) {
            versions.push(dist);
        }
        self
    }

    /// Register a distribution as installed in the target environment.
    ///
    /// Only one installed distribution is kept per package; a later call
    /// replaces an earlier one.
    pub fn add_installed(&mut self, dist: Distribution) -> &mut Self {
        self.set_installed(Arc::new(dist))
    }

    pub(crate) fn set_installed(&mut self, dist: Arc<Distribution>) -> &mut Self {
        self.installed.insert(dist.name().clone(), dist);
        self
    }

    /// Register a distribution reachable only through a direct reference.
    pub fn add_url(&mut self, url: impl Into<String>, dist: Distribution) -> &mut Self {
        self.urls.insert(url.into(), Arc::new(dist));
        self
    }

    /// Find a distribution by identity among index, installed and URL entries.
    pub fn find(&self, name: &PackageName, version: &Version, source: &Source) -> Option<Arc<Distribution>> {
        let matches = |dist: &&Arc<Distribution>| {
            dist.name() == name && dist.version() == version && dist.source() == source
        };
        self.packages
            .get(name)
            .and_then(|versions| versions.iter().find(matches))
            .or_else(|| self.installed.get(name).filter(matches))
            .or_else(|| self.urls.values().find(matches))
            .cloned()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &PackageName> {
        self.packages.keys()
    }

    pub fn len(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PackageIndex for InMemoryIndex {
    fn versions(&self, name: &PackageName) -> Result<Vec<Arc<Distribution>>> {
        Ok(self.packages.get(name).cloned().unwrap_or_default())
    }

    fn installed(&self, name: &PackageName) -> Option<Arc<Distribution>> {
        self.installed.get(name).cloned()
    }

    fn fetch_url(&self, name: &PackageName, url: &str) -> Result<Arc<Distribution>> {
        match self.urls.get(url) {
            Some(dist) if dist.name() == name => Ok(Arc::clone(dist)),
            Some(dist) => Err(Error::InvalidMetadata {
                package: name.to_string(),
                reason: format!("{} provides {}, not {}", url, dist.name(), name),
            }),
            None => Err(Error::UrlNotFound {
                name: name.to_string(),
                url: url.to_string(),
            }),
        }
    }
}
