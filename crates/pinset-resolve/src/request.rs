use std::collections::HashMap;

use indexmap::IndexMap;
use pinset_version::{ParsedRequirement, SpecifierSet, Version};

use crate::package::{Identifier, PackageName};
use crate::{Error, Result};

/// A requirement given by the user, with its position in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequirement {
    pub requirement: String,
    pub order: usize,
}

/// A request specifies what needs to be resolved.
///
/// Requirements are kept as written and parsed when the request is resolved.
#[derive(Debug, Clone)]
pub struct Request {
    /// Root requirements, in request order
    pub requires: Vec<RootRequirement>,

    /// Specifier the target runtime must satisfy
    pub requires_environment: String,

    /// Version of the target runtime
    pub environment_version: Version,

    /// Global constraints (name -> specifiers); they narrow candidates but
    /// never pull a package into the resolution
    /// Uses IndexMap to preserve insertion order
    pub constraints: IndexMap<String, String>,
}

impl Request {
    /// Create an empty request for a target runtime version.
    pub fn new(environment_version: Version) -> Self {
        Self {
            requires: Vec::new(),
            requires_environment: String::new(),
            environment_version,
            constraints: IndexMap::new(),
        }
    }

    /// Add a requirement at the next position.
    pub fn require(&mut self, requirement: impl Into<String>) -> &mut Self {
        let order = self.requires.iter().map(|r| r.order + 1).max().unwrap_or(0);
        self.require_with_order(requirement, order)
    }

    /// Add a requirement with an explicit position.
    pub fn require_with_order(&mut self, requirement: impl Into<String>, order: usize) -> &mut Self {
        self.requires.push(RootRequirement {
            requirement: requirement.into(),
            order,
        });
        self
    }

    /// Constrain the target runtime version.
    pub fn require_environment(&mut self, specifier: impl Into<String>) -> &mut Self {
        self.requires_environment = specifier.into();
        self
    }

    /// Add a global constraint.
    pub fn constrain(&mut self, name: impl Into<String>, specifier: impl Into<String>) -> &mut Self {
        self.constraints.insert(name.into(), specifier.into());
        self
    }

    /// Parse the root requirements.
    pub fn parsed_requires(&self) -> Result<Vec<(ParsedRequirement, usize)>> {
        self.requires
            .iter()
            .map(|root| Ok((ParsedRequirement::parse(&root.requirement)?, root.order)))
            .collect()
    }

    pub fn environment_specifier(&self) -> Result<SpecifierSet> {
        Ok(SpecifierSet::parse(&self.requires_environment)?)
    }

    /// Parse the global constraints, merging constraints on the same package.
    pub fn parsed_constraints(&self) -> Result<IndexMap<PackageName, SpecifierSet>> {
        let mut constraints: IndexMap<PackageName, SpecifierSet> = IndexMap::new();
        for (name, specifier) in &self.constraints {
            let set = SpecifierSet::parse(specifier)
                .map_err(|e| Error::Config(format!("Invalid constraint for {}: {}", name, e)))?;
            let entry = constraints.entry(PackageName::new(name)).or_default();
            *entry = entry.intersect(&set);
        }
        Ok(constraints)
    }

    /// Requested identifiers and their positions; the first position wins
    /// for repeated requirements.
    pub fn user_requested(&self) -> Result<HashMap<Identifier, usize>> {
        let mut requested = HashMap::new();
        for (parsed, order) in self.parsed_requires()? {
            let identifier = Identifier::package(PackageName::new(&parsed.name));
            let position = requested.entry(identifier).or_insert(order);
            *position = (*position).min(order);
        }
        Ok(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(Version::parse("3.11").unwrap())
    }

    #[test]
    fn test_positional_order() {
        let mut request = request();
        request.require("a>=1").require("b").require_with_order("c", 10).require("d");

        let orders: Vec<usize> = request.requires.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_user_requested() {
        let mut request = request();
        request
            .require_with_order("Foo[bar]>=1", 3)
            .require_with_order("foo<3", 1)
            .require_with_order("baz", 2);

        let requested = request.user_requested().unwrap();
        assert_eq!(requested.get(&Identifier::package("foo")), Some(&1));
        assert_eq!(requested.get(&Identifier::package("baz")), Some(&2));
        assert_eq!(requested.len(), 2);
    }

    #[test]
    fn test_invalid_requirement() {
        let mut request = request();
        request.require("a >>> 1");
        assert!(matches!(
            request.parsed_requires(),
            Err(Error::InvalidRequirement(_))
        ));
    }

    #[test]
    fn test_constraints_merge() {
        let mut request = request();
        request.constrain("Foo", ">=1").constrain("foo", "<2");
        let constraints = request.parsed_constraints().unwrap();
        assert_eq!(constraints.len(), 1);
        // keys differ in spelling, so both are kept and merged
        assert_eq!(constraints[&PackageName::new("foo")].len(), 2);
    }

    #[test]
    fn test_environment_specifier() {
        let mut request = request();
        assert!(request.environment_specifier().unwrap().is_free());
        request.require_environment(">=3.8");
        assert!(request
            .environment_specifier()
            .unwrap()
            .contains(&request.environment_version, true));
    }
}
