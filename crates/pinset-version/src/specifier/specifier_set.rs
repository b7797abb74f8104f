//! SpecifierSet - conjunction of specifiers

use std::fmt;
use std::str::FromStr;

use super::{Operator, Specifier};
use crate::{ParseError, Version};

/// A comma-separated conjunction of specifiers, e.g. `>=1.0,<2,!=1.3`.
///
/// The empty set matches every version and is considered "free".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Create an empty (match-all) set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of specifiers. Blank input yields the empty set.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let specifiers = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    pub fn from_specifiers(specifiers: impl IntoIterator<Item = Specifier>) -> Self {
        Self {
            specifiers: specifiers.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.specifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.specifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// No version-narrowing operator at all.
    pub fn is_free(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Any member pins to exactly one version (`==X` without wildcard, or `===X`).
    pub fn is_pinned(&self) -> bool {
        self.specifiers.iter().any(Specifier::is_pinned)
    }

    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.specifiers.iter().map(Specifier::operator)
    }

    /// Whether any member explicitly names a pre-release version.
    pub fn mentions_prerelease(&self) -> bool {
        self.specifiers.iter().any(Specifier::mentions_prerelease)
    }

    /// Check whether a version satisfies every member.
    ///
    /// When `prereleases` is false, pre-release versions are rejected unless
    /// a member explicitly mentions a pre-release.
    pub fn contains(&self, version: &Version, prereleases: bool) -> bool {
        if !prereleases && version.is_prerelease() && !self.mentions_prerelease() {
            return false;
        }
        self.specifiers.iter().all(|spec| spec.contains(version))
    }

    /// Combine two sets; the result matches versions matched by both.
    pub fn intersect(&self, other: &SpecifierSet) -> SpecifierSet {
        let mut specifiers = self.specifiers.clone();
        for spec in &other.specifiers {
            if !specifiers.contains(spec) {
                specifiers.push(spec.clone());
            }
        }
        SpecifierSet { specifiers }
    }
}

impl FromStr for SpecifierSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecifierSet::parse(s)
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl<'a> IntoIterator for &'a SpecifierSet {
    type Item = &'a Specifier;
    type IntoIter = std::slice::Iter<'a, Specifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.specifiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> SpecifierSet {
        SpecifierSet::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_empty_set_is_free() {
        let s = set("");
        assert!(s.is_free());
        assert!(!s.is_pinned());
        assert!(s.contains(&v("0.1"), false));
        assert_eq!(s.to_string(), "");
    }

    #[test]
    fn test_conjunction() {
        let s = set(">=1.0, <2.0, !=1.3");
        assert_eq!(s.len(), 3);
        assert!(s.contains(&v("1.5"), false));
        assert!(!s.contains(&v("1.3"), false));
        assert!(!s.contains(&v("2.0"), false));
        assert_eq!(s.to_string(), ">=1.0,<2.0,!=1.3");
    }

    #[test]
    fn test_prerelease_gate() {
        let s = set(">=1.0");
        assert!(!s.contains(&v("2.0b1"), false));
        assert!(s.contains(&v("2.0b1"), true));

        let s = set(">=2.0b1");
        assert!(s.mentions_prerelease());
        assert!(s.contains(&v("2.0b2"), false));
    }

    #[test]
    fn test_pinned_vs_wildcard() {
        assert!(set("==1.0").is_pinned());
        assert!(!set("==1.*").is_pinned());
        assert!(!set("==1.*").is_free());
        assert!(set(">=1,==1.2").is_pinned());
    }

    #[test]
    fn test_intersect() {
        let merged = set(">=1.0").intersect(&set("<2.0,>=1.0"));
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&v("1.5"), false));
        assert!(!merged.contains(&v("2.1"), false));
    }

    #[test]
    fn test_invalid_member() {
        assert!(SpecifierSet::parse(">=1.0,foo").is_err());
    }
}
