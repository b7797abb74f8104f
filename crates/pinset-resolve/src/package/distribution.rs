use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use pinset_version::Version;
use serde::{Deserialize, Serialize};

use super::PackageName;

/// Where a distribution comes from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum Source {
    /// A named package index
    Index(String),
    /// A direct URL reference
    Url(String),
    /// A local path reference
    Path(PathBuf),
    /// Already present in the target environment
    Installed,
}

impl Source {
    pub fn is_direct(&self) -> bool {
        matches!(self, Source::Url(_) | Source::Path(_))
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Index("default".to_string())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Index(name) => write!(f, "index {}", name),
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Installed => f.write_str("installed"),
        }
    }
}

/// Metadata of one concrete version of a package.
///
/// Dependency lists are kept as written; they are parsed when the
/// distribution is expanded, so broken metadata only fails the candidates
/// that actually reach expansion.
#[derive(Debug, Clone)]
pub struct Distribution {
    name: PackageName,
    version: Version,
    source: Source,
    requires: Vec<String>,
    extras: BTreeMap<String, Vec<String>>,
    requires_environment: Option<String>,
}

impl Distribution {
    pub fn new(name: impl Into<PackageName>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            source: Source::default(),
            requires: Vec::new(),
            extras: BTreeMap::new(),
            requires_environment: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_requires<S: Into<String>>(mut self, requires: impl IntoIterator<Item = S>) -> Self {
        self.requires.extend(requires.into_iter().map(Into::into));
        self
    }

    pub fn with_extra<S: Into<String>>(
        mut self,
        extra: &str,
        requires: impl IntoIterator<Item = S>,
    ) -> Self {
        self.extras
            .entry(extra.to_lowercase())
            .or_default()
            .extend(requires.into_iter().map(Into::into));
        self
    }

    pub fn with_requires_environment(mut self, specifier: impl Into<String>) -> Self {
        self.requires_environment = Some(specifier.into());
        self
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn extras(&self) -> &BTreeMap<String, Vec<String>> {
        &self.extras
    }

    /// Dependencies declared for one extra, if the distribution provides it.
    pub fn extra_requires(&self, extra: &str) -> Option<&[String]> {
        self.extras.get(extra).map(Vec::as_slice)
    }

    pub fn requires_environment(&self) -> Option<&str> {
        self.requires_environment.as_deref()
    }
}

// Identity is (name, version, source); metadata is not part of it.
impl PartialEq for Distribution {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.source == other.source
    }
}

impl Eq for Distribution {}

impl Hash for Distribution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_identity_ignores_metadata() {
        let a = Distribution::new("pkg", v("1.0")).with_requires(["dep>=1"]);
        let b = Distribution::new("PKG", v("1.0.0"));
        assert_eq!(a, b);

        let c = Distribution::new("pkg", v("1.0")).with_source(Source::Url("https://x/pkg.tar.gz".into()));
        assert_ne!(a, c);
    }

    #[test]
    fn test_extras_are_lowercased() {
        let dist = Distribution::new("pkg", v("1.0")).with_extra("Socks", ["pysocks"]);
        assert_eq!(dist.extra_requires("socks"), Some(&["pysocks".to_string()][..]));
        assert!(dist.extra_requires("missing").is_none());
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&Source::Url("https://x".into())).unwrap();
        assert_eq!(json, r#"{"type":"url","location":"https://x"}"#);
        let json = serde_json::to_string(&Source::Installed).unwrap();
        assert_eq!(json, r#"{"type":"installed"}"#);
    }
}
