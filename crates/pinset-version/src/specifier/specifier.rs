//! A single `<operator><version>` specifier

use std::fmt;
use std::str::FromStr;

use super::Operator;
use crate::{ParseError, Version};

/// One version specifier such as `>=1.0`, `==2.*` or `~=1.4.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specifier {
    operator: Operator,
    version: Version,
    wildcard: bool,
    /// Version text as written, used for display and `===`
    raw: String,
}

impl Specifier {
    /// Build a specifier from its parts.
    pub fn new(operator: Operator, version: Version, wildcard: bool) -> Result<Self, ParseError> {
        let raw = version.to_string();
        Self::checked(operator, version, wildcard, raw)
    }

    fn checked(
        operator: Operator,
        version: Version,
        wildcard: bool,
        raw: String,
    ) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidSpecifier {
            specifier: format!("{}{}{}", operator, raw, if wildcard { ".*" } else { "" }),
            reason: reason.to_string(),
        };

        if wildcard {
            if !operator.allows_wildcard() {
                return Err(invalid("wildcards are only allowed with == and !="));
            }
            if version.is_prerelease() || version.is_postrelease() {
                return Err(invalid("wildcards only apply to release segments"));
            }
        }
        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(invalid("~= requires at least two release segments"));
        }

        Ok(Self {
            operator,
            version,
            wildcard,
            raw,
        })
    }

    /// Parse a specifier string like `>= 1.0` or `==1.*`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        let op = Operator::supported_operators()
            .iter()
            .find(|op| trimmed.starts_with(**op))
            .ok_or_else(|| ParseError::InvalidSpecifier {
                specifier: input.to_string(),
                reason: "missing operator".to_string(),
            })?;
        let operator: Operator = op.parse()?;
        let rest = trimmed[op.len()..].trim();
        if rest.is_empty() {
            return Err(ParseError::InvalidSpecifier {
                specifier: input.to_string(),
                reason: "missing version".to_string(),
            });
        }

        let (text, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };
        let version = Version::parse(text).map_err(|_| ParseError::InvalidSpecifier {
            specifier: input.to_string(),
            reason: format!("invalid version \"{}\"", text),
        })?;

        Self::checked(operator, version, wildcard, text.to_string())
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// A specifier pins when it admits exactly one concrete version.
    pub fn is_pinned(&self) -> bool {
        match self.operator {
            Operator::ArbitraryEqual => true,
            Operator::Equal => !self.wildcard,
            _ => false,
        }
    }

    /// Whether this specifier explicitly opts in to pre-releases.
    pub fn mentions_prerelease(&self) -> bool {
        self.operator != Operator::NotEqual && self.version.is_prerelease()
    }

    /// Check whether a version matches this specifier.
    ///
    /// Pre-releases are matched like any other version; callers decide
    /// whether pre-releases are acceptable at all.
    pub fn contains(&self, candidate: &Version) -> bool {
        let spec = &self.version;
        match self.operator {
            Operator::Equal => self.equals(candidate),
            Operator::NotEqual => !self.equals(candidate),
            Operator::LessThanOrEqual => candidate <= spec,
            Operator::GreaterThanOrEqual => candidate >= spec,
            Operator::LessThan => {
                candidate < spec
                    && !(!spec.is_prerelease()
                        && candidate.is_prerelease()
                        && candidate.same_release(spec))
            }
            Operator::GreaterThan => {
                candidate > spec
                    && !(!spec.is_postrelease()
                        && candidate.is_postrelease()
                        && candidate.same_release(spec))
            }
            Operator::Compatible => {
                let release = spec.release();
                let prefix = &release[..release.len() - 1];
                candidate >= spec && candidate.has_release_prefix(spec.epoch(), prefix)
            }
            Operator::ArbitraryEqual => candidate.to_string().eq_ignore_ascii_case(&self.raw),
        }
    }

    fn equals(&self, candidate: &Version) -> bool {
        if self.wildcard {
            candidate.has_release_prefix(self.version.epoch(), self.version.release())
        } else {
            candidate == &self.version
        }
    }
}

impl FromStr for Specifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specifier::parse(s)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.raw)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> Specifier {
        Specifier::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_specifier() {
        let s = spec(">= 1.0");
        assert_eq!(s.operator(), Operator::GreaterThanOrEqual);
        assert_eq!(s.version(), &v("1.0"));
        assert_eq!(s.to_string(), ">=1.0");

        let s = spec("==1.*");
        assert!(s.is_wildcard());
        assert_eq!(s.to_string(), "==1.*");
    }

    #[test]
    fn test_parse_specifier_errors() {
        assert!(Specifier::parse("1.0").is_err());
        assert!(Specifier::parse(">=").is_err());
        assert!(Specifier::parse(">=1.*").is_err());
        assert!(Specifier::parse("~=1").is_err());
        assert!(Specifier::parse("==1.0a1.*").is_err());
    }

    #[test]
    fn test_equal_and_wildcard() {
        assert!(spec("==1.0").contains(&v("1.0.0")));
        assert!(!spec("==1.0").contains(&v("1.0.1")));
        assert!(spec("==1.*").contains(&v("1.9")));
        assert!(spec("==1.*").contains(&v("1")));
        assert!(!spec("==1.*").contains(&v("2.0")));
        assert!(spec("!=1.*").contains(&v("2.0")));
        assert!(!spec("!=1.0").contains(&v("1.0")));
    }

    #[test]
    fn test_compatible_release() {
        let s = spec("~=1.4.2");
        assert!(s.contains(&v("1.4.2")));
        assert!(s.contains(&v("1.4.9")));
        assert!(!s.contains(&v("1.5.0")));
        assert!(!s.contains(&v("1.4.1")));

        let s = spec("~=2.2");
        assert!(s.contains(&v("2.9")));
        assert!(!s.contains(&v("3.0")));
    }

    #[test]
    fn test_exclusive_bounds_and_prereleases() {
        assert!(!spec("<2.0").contains(&v("2.0rc1")));
        assert!(spec("<2.0rc2").contains(&v("2.0rc1")));
        assert!(spec("<2.0").contains(&v("1.9")));
        assert!(!spec(">1.0").contains(&v("1.0.post1")));
        assert!(spec(">1.0.post1").contains(&v("1.0.post2")));
        assert!(spec(">1.0").contains(&v("1.1")));
    }

    #[test]
    fn test_pinned() {
        assert!(spec("==1.0").is_pinned());
        assert!(spec("===1.0").is_pinned());
        assert!(!spec("==1.*").is_pinned());
        assert!(!spec(">=1.0").is_pinned());
    }

    #[test]
    fn test_arbitrary_equal() {
        assert!(spec("===1.0").contains(&v("1.0")));
        assert!(!spec("===1.0").contains(&v("1.0.0")));
    }
}
