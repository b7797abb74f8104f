use std::collections::BTreeSet;
use std::fmt;

use pinset_version::{ParsedRequirement, SpecifierSet};

use super::{Candidate, Identifier, PackageName, Source};

/// `name[extras] <specifiers>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecifierRequirement {
    name: PackageName,
    extras: BTreeSet<String>,
    specifier: SpecifierSet,
}

impl SpecifierRequirement {
    pub fn new(name: impl Into<PackageName>, extras: BTreeSet<String>, specifier: SpecifierSet) -> Self {
        Self {
            name: name.into(),
            extras,
            specifier,
        }
    }

    /// Convert a parsed requirement that carries no URL.
    pub fn from_parsed(parsed: &ParsedRequirement) -> Self {
        Self::new(
            PackageName::new(&parsed.name),
            parsed.extras.clone(),
            parsed.specifier.clone(),
        )
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn extras(&self) -> &BTreeSet<String> {
        &self.extras
    }

    pub fn specifier(&self) -> &SpecifierSet {
        &self.specifier
    }
}

/// A requirement on one predetermined candidate (URL or path reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplicitRequirement {
    candidate: Candidate,
}

impl ExplicitRequirement {
    pub fn new(candidate: Candidate) -> Self {
        Self { candidate }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }
}

/// Constraint on the target runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentRequirement {
    specifier: SpecifierSet,
}

impl EnvironmentRequirement {
    pub fn new(specifier: SpecifierSet) -> Self {
        Self { specifier }
    }

    pub fn specifier(&self) -> &SpecifierSet {
        &self.specifier
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    Specifier(SpecifierRequirement),
    Explicit(ExplicitRequirement),
    Environment(EnvironmentRequirement),
}

impl Requirement {
    pub fn specifier(
        name: impl Into<PackageName>,
        extras: BTreeSet<String>,
        specifier: SpecifierSet,
    ) -> Self {
        Requirement::Specifier(SpecifierRequirement::new(name, extras, specifier))
    }

    pub fn explicit(candidate: Candidate) -> Self {
        Requirement::Explicit(ExplicitRequirement::new(candidate))
    }

    pub fn environment(specifier: SpecifierSet) -> Self {
        Requirement::Environment(EnvironmentRequirement::new(specifier))
    }

    /// The identifier whose criterion this requirement joins.
    pub fn identifier(&self) -> Identifier {
        match self {
            Requirement::Specifier(req) => Identifier::Package {
                name: req.name.clone(),
                extras: req.extras.clone(),
            },
            Requirement::Explicit(req) => req.candidate.identifier(),
            Requirement::Environment(_) => Identifier::Environment,
        }
    }

    pub fn name(&self) -> Option<&PackageName> {
        match self {
            Requirement::Specifier(req) => Some(&req.name),
            Requirement::Explicit(req) => req.candidate.name(),
            Requirement::Environment(_) => None,
        }
    }

    /// The version specifiers, for requirements that have them.
    pub fn specifier_set(&self) -> Option<&SpecifierSet> {
        match self {
            Requirement::Specifier(req) => Some(&req.specifier),
            Requirement::Environment(req) => Some(&req.specifier),
            Requirement::Explicit(_) => None,
        }
    }

    pub fn explicit_candidate(&self) -> Option<&Candidate> {
        match self {
            Requirement::Explicit(req) => Some(&req.candidate),
            _ => None,
        }
    }

    /// Pins one exact version through its specifiers.
    ///
    /// A direct reference is not pinned in this sense; it is reported by
    /// [`Requirement::is_direct`] instead.
    pub fn is_pinned(&self) -> bool {
        self.specifier_set().is_some_and(SpecifierSet::is_pinned)
    }

    /// Carries no version-narrowing operator. Direct references have none.
    pub fn is_free(&self) -> bool {
        self.specifier_set().map_or(true, SpecifierSet::is_free)
    }

    /// References one candidate directly rather than through a version range.
    pub fn is_direct(&self) -> bool {
        matches!(self, Requirement::Explicit(_))
    }

    pub fn is_satisfied_by(&self, candidate: &Candidate) -> bool {
        match (self, candidate) {
            (Requirement::Environment(req), Candidate::Environment(version)) => {
                req.specifier.contains(version, true)
            }
            (Requirement::Environment(_), _) | (_, Candidate::Environment(_)) => false,
            (Requirement::Specifier(req), _) => {
                candidate.name() == Some(&req.name)
                    && candidate.provides_extras(&req.extras)
                    && req.specifier.contains(candidate.version(), true)
            }
            (Requirement::Explicit(req), _) => {
                candidate.base_key() == req.candidate.base_key()
                    && req
                        .candidate
                        .extras()
                        .map_or(true, |extras| candidate.provides_extras(extras))
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Specifier(req) => {
                write!(f, "{}", self.identifier())?;
                write!(f, "{}", req.specifier)
            }
            Requirement::Explicit(req) => {
                let candidate = &req.candidate;
                match candidate.source() {
                    Some(source @ (Source::Url(_) | Source::Path(_))) => {
                        write!(f, "{} @ {}", candidate.identifier(), source)
                    }
                    _ => write!(f, "{}=={}", candidate.identifier(), candidate.version()),
                }
            }
            Requirement::Environment(req) if req.specifier.is_free() => f.write_str("<environment>"),
            Requirement::Environment(req) => write!(f, "<environment> {}", req.specifier),
        }
    }
}
