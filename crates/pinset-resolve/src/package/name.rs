use std::collections::BTreeSet;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[-_.]+").unwrap();
}

/// A normalized package name.
///
/// Names compare case-insensitively and treat runs of `-`, `_` and `.` as a
/// single `-`, so `Foo_Bar`, `foo.bar` and `foo-bar` are the same package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: &str) -> Self {
        Self(SEPARATORS.replace_all(name.trim(), "-").to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PackageName {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of one criterion in the resolver.
///
/// `Environment` is declared first so it sorts before every package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    /// The target runtime pseudo-package
    Environment,
    Package {
        name: PackageName,
        extras: BTreeSet<String>,
    },
}

impl Identifier {
    pub fn package(name: impl Into<PackageName>) -> Self {
        Identifier::Package {
            name: name.into(),
            extras: BTreeSet::new(),
        }
    }

    pub fn with_extras<S: Into<String>>(
        name: impl Into<PackageName>,
        extras: impl IntoIterator<Item = S>,
    ) -> Self {
        Identifier::Package {
            name: name.into(),
            extras: extras.into_iter().map(|e| e.into().to_lowercase()).collect(),
        }
    }

    pub fn name(&self) -> Option<&PackageName> {
        match self {
            Identifier::Environment => None,
            Identifier::Package { name, .. } => Some(name),
        }
    }

    pub fn extras(&self) -> Option<&BTreeSet<String>> {
        match self {
            Identifier::Environment => None,
            Identifier::Package { extras, .. } => Some(extras),
        }
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, Identifier::Environment)
    }

    /// The same identifier with its extras stripped.
    pub fn base(&self) -> Identifier {
        match self {
            Identifier::Environment => Identifier::Environment,
            Identifier::Package { name, .. } => Identifier::package(name.clone()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Environment => f.write_str("<environment>"),
            Identifier::Package { name, extras } if extras.is_empty() => write!(f, "{}", name),
            Identifier::Package { name, extras } => {
                let extras: Vec<&str> = extras.iter().map(String::as_str).collect();
                write!(f, "{}[{}]", name, extras.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        assert_eq!(PackageName::new("Foo_Bar").as_str(), "foo-bar");
        assert_eq!(PackageName::new("foo.__bar").as_str(), "foo-bar");
        assert_eq!(PackageName::new("Foo-Bar"), PackageName::new("foo.bar"));
        assert_eq!(PackageName::new("requests").as_str(), "requests");
    }

    #[test]
    fn test_environment_sorts_first() {
        let mut ids = vec![
            Identifier::with_extras("a", ["x"]),
            Identifier::package("b"),
            Identifier::Environment,
            Identifier::package("a"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                Identifier::Environment,
                Identifier::package("a"),
                Identifier::with_extras("a", ["x"]),
                Identifier::package("b"),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Identifier::Environment.to_string(), "<environment>");
        assert_eq!(Identifier::package("Foo").to_string(), "foo");
        assert_eq!(
            Identifier::with_extras("foo", ["B", "a"]).to_string(),
            "foo[a,b]"
        );
        assert_eq!(
            Identifier::with_extras("foo", ["a"]).base(),
            Identifier::package("foo")
        );
    }
}
