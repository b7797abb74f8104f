//! Textual requirement parsing: `name[extra,...] specifiers` or `name[extra] @ url`

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{ParseError, SpecifierSet};

lazy_static! {
    static ref REQUIREMENT_RE: Regex = Regex::new(concat!(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)",
        r"\s*(?:\[(?P<extras>[^\]]*)\])?",
        r"\s*(?:@\s*(?P<url>\S+)|(?P<spec>[^@]*))\s*$"
    ))
    .unwrap();
    static ref EXTRA_RE: Regex = Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap();
}

/// A requirement as written by a user or in package metadata.
///
/// Environment markers are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedRequirement {
    pub name: String,
    pub extras: BTreeSet<String>,
    pub specifier: SpecifierSet,
    pub url: Option<String>,
}

impl ParsedRequirement {
    /// Parse a requirement string.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidRequirement {
            requirement: input.to_string(),
            reason: reason.to_string(),
        };

        if input.contains(';') {
            return Err(invalid("environment markers are not supported"));
        }

        let caps = REQUIREMENT_RE
            .captures(input)
            .ok_or_else(|| invalid("expected `name[extras] specifiers` or `name @ url`"))?;

        let mut extras = BTreeSet::new();
        if let Some(list) = caps.name("extras") {
            for extra in list.as_str().split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if !EXTRA_RE.is_match(extra) {
                    return Err(invalid(&format!("invalid extra \"{}\"", extra)));
                }
                extras.insert(extra.to_lowercase());
            }
        }

        let specifier = match caps.name("spec") {
            Some(spec) => SpecifierSet::parse(spec.as_str()).map_err(|e| invalid(&e.to_string()))?,
            None => SpecifierSet::new(),
        };

        Ok(Self {
            name: caps["name"].to_string(),
            extras,
            specifier,
            url: caps.name("url").map(|m| m.as_str().to_string()),
        })
    }
}

impl FromStr for ParsedRequirement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedRequirement::parse(s)
    }
}

impl fmt::Display for ParsedRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            let extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            write!(f, "[{}]", extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {}", url)
        } else {
            write!(f, "{}", self.specifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name() {
        let req = ParsedRequirement::parse("requests").unwrap();
        assert_eq!(req.name, "requests");
        assert!(req.extras.is_empty());
        assert!(req.specifier.is_free());
        assert!(req.url.is_none());
    }

    #[test]
    fn test_parse_extras_and_specifiers() {
        let req = ParsedRequirement::parse("Foo.Bar[Security, socks] >=2.0,<3").unwrap();
        assert_eq!(req.name, "Foo.Bar");
        assert_eq!(
            req.extras.iter().cloned().collect::<Vec<_>>(),
            vec!["security".to_string(), "socks".to_string()]
        );
        assert_eq!(req.specifier.len(), 2);
        assert_eq!(req.to_string(), "Foo.Bar[security,socks]>=2.0,<3");
    }

    #[test]
    fn test_parse_url() {
        let req = ParsedRequirement::parse("pkg @ https://example.com/pkg-1.0.tar.gz").unwrap();
        assert_eq!(req.url.as_deref(), Some("https://example.com/pkg-1.0.tar.gz"));
        assert!(req.specifier.is_free());
    }

    #[test]
    fn test_parse_errors() {
        assert!(ParsedRequirement::parse("").is_err());
        assert!(ParsedRequirement::parse("pkg >=1.0; python_version < '3'").is_err());
        assert!(ParsedRequirement::parse("pkg >>1").is_err());
        assert!(ParsedRequirement::parse("pkg[b@d]").is_err());
    }
}
