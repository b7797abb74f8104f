use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::package::Distribution;
use crate::Error;

/// When an already installed distribution should be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpgradeStrategy {
    /// Always rank by version; installed distributions get no bonus
    Eager,
    /// Keep installed distributions unless the user asked for the package
    #[default]
    OnlyIfNeeded,
    /// Keep installed distributions whenever they still satisfy
    ToSatisfyOnly,
}

impl UpgradeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeStrategy::Eager => "eager",
            UpgradeStrategy::OnlyIfNeeded => "only-if-needed",
            UpgradeStrategy::ToSatisfyOnly => "to-satisfy-only",
        }
    }
}

impl FromStr for UpgradeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eager" => Ok(UpgradeStrategy::Eager),
            "only-if-needed" => Ok(UpgradeStrategy::OnlyIfNeeded),
            "to-satisfy-only" => Ok(UpgradeStrategy::ToSatisfyOnly),
            other => Err(Error::Config(format!("unknown upgrade strategy \"{}\"", other))),
        }
    }
}

impl fmt::Display for UpgradeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for ordering the distributions of one package.
///
/// When several distributions can satisfy an identifier, the policy decides
/// which one the resolver tries first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Prefer lowest versions (for testing minimum bounds)
    pub prefer_lowest: bool,
    /// Accept pre-releases without a specifier asking for them
    pub allow_prereleases: bool,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    pub fn allow_prereleases(mut self, allow: bool) -> Self {
        self.allow_prereleases = allow;
        self
    }

    /// Drop pre-releases unless they are allowed, explicitly asked for, or
    /// the only thing left.
    pub fn filter_prereleases(
        &self,
        dists: Vec<Arc<Distribution>>,
        requested: bool,
    ) -> Vec<Arc<Distribution>> {
        if self.allow_prereleases || requested {
            return dists;
        }
        let has_final = dists
            .iter()
            .any(|d| !d.version().is_prerelease() || d.source().is_direct());
        if !has_final {
            return dists;
        }
        dists
            .into_iter()
            .filter(|d| !d.version().is_prerelease() || d.source().is_direct())
            .collect()
    }

    /// Sort distributions by preference, best first.
    ///
    /// With `installed` set, that distribution is moved to the front.
    pub fn select_preferred(
        &self,
        mut dists: Vec<Arc<Distribution>>,
        installed: Option<&Arc<Distribution>>,
    ) -> Vec<Arc<Distribution>> {
        dists.sort_by(|a, b| self.compare_by_priority(a, b, installed));
        dists
    }

    fn compare_by_priority(
        &self,
        a: &Distribution,
        b: &Distribution,
        installed: Option<&Arc<Distribution>>,
    ) -> Ordering {
        if let Some(installed) = installed {
            let a_installed = a == installed.as_ref();
            let b_installed = b == installed.as_ref();
            if a_installed != b_installed {
                return if a_installed { Ordering::Less } else { Ordering::Greater };
            }
        }

        // equal versions keep index order (stable sort)
        let by_version = a.version().cmp(b.version());
        if self.prefer_lowest {
            by_version
        } else {
            by_version.reverse()
        }
    }
}

#[cfg(test)]
mod tests {
    use pinset_version::Version;

    use super::*;
    use crate::package::Source;

    fn dist(version: &str) -> Arc<Distribution> {
        Arc::new(Distribution::new("pkg", Version::parse(version).unwrap()))
    }

    fn versions(dists: &[Arc<Distribution>]) -> Vec<String> {
        dists.iter().map(|d| d.version().to_string()).collect()
    }

    #[test]
    fn test_newest_first() {
        let policy = Policy::new();
        let sorted = policy.select_preferred(vec![dist("1.0"), dist("3.0"), dist("2.0")], None);
        assert_eq!(versions(&sorted), vec!["3.0", "2.0", "1.0"]);
    }

    #[test]
    fn test_prefer_lowest() {
        let policy = Policy::new().prefer_lowest(true);
        let sorted = policy.select_preferred(vec![dist("1.0"), dist("3.0"), dist("2.0")], None);
        assert_eq!(versions(&sorted), vec!["1.0", "2.0", "3.0"]);
    }

    #[test]
    fn test_installed_first() {
        let policy = Policy::new();
        let installed = dist("2.0");
        let sorted = policy.select_preferred(
            vec![dist("1.0"), dist("3.0"), installed.clone()],
            Some(&installed),
        );
        assert_eq!(versions(&sorted), vec!["2.0", "3.0", "1.0"]);
    }

    #[test]
    fn test_prerelease_filter() {
        let policy = Policy::new();
        let kept = policy.filter_prereleases(vec![dist("1.0"), dist("2.0b1")], false);
        assert_eq!(versions(&kept), vec!["1.0"]);

        let kept = policy.filter_prereleases(vec![dist("1.0"), dist("2.0b1")], true);
        assert_eq!(kept.len(), 2);

        // nothing else available
        let kept = policy.filter_prereleases(vec![dist("2.0b1")], false);
        assert_eq!(versions(&kept), vec!["2.0b1"]);

        let kept = Policy::new()
            .allow_prereleases(true)
            .filter_prereleases(vec![dist("1.0"), dist("2.0b1")], false);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_direct_prerelease_is_kept() {
        let direct = Arc::new(
            Distribution::new("pkg", Version::parse("2.0b1").unwrap())
                .with_source(Source::Url("https://x/pkg.whl".into())),
        );
        let kept = Policy::new().filter_prereleases(vec![dist("1.0"), direct], false);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_upgrade_strategy_parse() {
        assert_eq!("eager".parse::<UpgradeStrategy>().unwrap(), UpgradeStrategy::Eager);
        assert_eq!(
            "To-Satisfy-Only".parse::<UpgradeStrategy>().unwrap(),
            UpgradeStrategy::ToSatisfyOnly
        );
        assert!("sometimes".parse::<UpgradeStrategy>().is_err());
        assert_eq!(UpgradeStrategy::default(), UpgradeStrategy::OnlyIfNeeded);
    }
}
