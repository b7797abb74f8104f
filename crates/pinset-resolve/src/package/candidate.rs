use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use pinset_version::Version;

use super::{Distribution, Identifier, PackageName, Source};

/// A distribution selected together with a set of extras.
///
/// It depends on its own base distribution, so pinning `pkg[extra]` also pins
/// `pkg` to the very same distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtrasCandidate {
    base: Arc<Distribution>,
    extras: BTreeSet<String>,
}

impl ExtrasCandidate {
    pub fn new(base: Arc<Distribution>, extras: BTreeSet<String>) -> Self {
        Self { base, extras }
    }

    pub fn base(&self) -> &Arc<Distribution> {
        &self.base
    }

    pub fn extras(&self) -> &BTreeSet<String> {
        &self.extras
    }
}

/// Something that can be pinned for an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Candidate {
    Concrete(Arc<Distribution>),
    Extras(ExtrasCandidate),
    /// The target runtime, pinned for [`Identifier::Environment`]
    Environment(Version),
}

impl Candidate {
    /// Wrap a distribution for an identifier, adding extras when requested.
    pub fn for_distribution(dist: Arc<Distribution>, extras: &BTreeSet<String>) -> Self {
        if extras.is_empty() {
            Candidate::Concrete(dist)
        } else {
            Candidate::Extras(ExtrasCandidate::new(dist, extras.clone()))
        }
    }

    pub fn identifier(&self) -> Identifier {
        match self {
            Candidate::Concrete(dist) => Identifier::package(dist.name().clone()),
            Candidate::Extras(ec) => Identifier::Package {
                name: ec.base.name().clone(),
                extras: ec.extras.clone(),
            },
            Candidate::Environment(_) => Identifier::Environment,
        }
    }

    pub fn name(&self) -> Option<&PackageName> {
        self.distribution().map(|dist| dist.name())
    }

    pub fn version(&self) -> &Version {
        match self {
            Candidate::Concrete(dist) => dist.version(),
            Candidate::Extras(ec) => ec.base.version(),
            Candidate::Environment(version) => version,
        }
    }

    pub fn source(&self) -> Option<&Source> {
        self.distribution().map(|dist| dist.source())
    }

    /// The underlying distribution, absent for the environment candidate.
    pub fn distribution(&self) -> Option<&Arc<Distribution>> {
        match self {
            Candidate::Concrete(dist) => Some(dist),
            Candidate::Extras(ec) => Some(&ec.base),
            Candidate::Environment(_) => None,
        }
    }

    pub fn extras(&self) -> Option<&BTreeSet<String>> {
        match self {
            Candidate::Extras(ec) => Some(&ec.extras),
            _ => None,
        }
    }

    /// Whether the candidate provides at least the given extras.
    pub fn provides_extras(&self, extras: &BTreeSet<String>) -> bool {
        match self.extras() {
            Some(own) => extras.is_subset(own),
            None => extras.is_empty(),
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self.source(), Some(Source::Installed))
    }

    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            identifier: self.identifier(),
            version: self.version().clone(),
            source: self.source().cloned(),
        }
    }

    /// Identity of the candidate with extras stripped.
    pub fn base_key(&self) -> CandidateKey {
        CandidateKey {
            identifier: self.identifier().base(),
            version: self.version().clone(),
            source: self.source().cloned(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier(), self.version())?;
        match self.source() {
            Some(source) if source.is_direct() => write!(f, " (from {})", source),
            _ => Ok(()),
        }
    }
}

/// Non-owning identity of a candidate, used to point at the parent of a
/// requirement without keeping the candidate alive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    pub identifier: Identifier,
    pub version: Version,
    pub source: Option<Source>,
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(name: &str, version: &str) -> Arc<Distribution> {
        Arc::new(Distribution::new(name, Version::parse(version).unwrap()))
    }

    fn extras(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_concrete_candidate() {
        let c = Candidate::for_distribution(dist("pkg", "1.0"), &BTreeSet::new());
        assert_eq!(c.identifier(), Identifier::package("pkg"));
        assert_eq!(c.to_string(), "pkg 1.0");
        assert!(c.provides_extras(&BTreeSet::new()));
        assert!(!c.provides_extras(&extras(&["x"])));
    }

    #[test]
    fn test_extras_candidate_shares_base_identity() {
        let base = dist("pkg", "1.0");
        let c = Candidate::for_distribution(base.clone(), &extras(&["x", "y"]));
        assert_eq!(c.identifier(), Identifier::with_extras("pkg", ["x", "y"]));
        assert_eq!(c.base_key(), Candidate::Concrete(base).key());
        assert!(c.provides_extras(&extras(&["x"])));
        assert!(!c.provides_extras(&extras(&["z"])));
        assert_eq!(c.to_string(), "pkg[x,y] 1.0");
    }

    #[test]
    fn test_environment_candidate() {
        let c = Candidate::Environment(Version::parse("3.11").unwrap());
        assert_eq!(c.identifier(), Identifier::Environment);
        assert!(c.distribution().is_none());
        assert_eq!(c.key().source, None);
    }

    #[test]
    fn test_direct_source_display() {
        let d = Distribution::new("pkg", Version::parse("2.0").unwrap())
            .with_source(Source::Url("https://example.com/pkg.whl".into()));
        let c = Candidate::Concrete(Arc::new(d));
        assert_eq!(c.to_string(), "pkg 2.0 (from https://example.com/pkg.whl)");
    }
}
