use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;
use pinset_version::{ParsedRequirement, SpecifierSet, Version};

use crate::index::PackageIndex;
use crate::package::{
    Candidate, CandidateKey, Distribution, Identifier, PackageName, Requirement,
    SpecifierRequirement,
};
use crate::{Error, Result};

use super::Policy;

/// Builds candidates and requirements out of index data.
///
/// Dependency expansion is memoized per candidate, so repeated queries while
/// backtracking do not re-parse metadata.
pub struct Factory<I> {
    index: I,
    environment: Version,
    policy: Policy,
    constraints: IndexMap<PackageName, SpecifierSet>,
    dependency_cache: RefCell<HashMap<(CandidateKey, bool), Vec<Requirement>>>,
}

impl<I: PackageIndex> Factory<I> {
    pub fn new(index: I, environment: Version, policy: Policy) -> Self {
        Self {
            index,
            environment,
            policy,
            constraints: IndexMap::new(),
            dependency_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Global constraints: they narrow candidate pools without making a
    /// package part of the resolution.
    pub fn with_constraints(mut self, constraints: IndexMap<PackageName, SpecifierSet>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Version of the target runtime.
    pub fn environment(&self) -> &Version {
        &self.environment
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Turn a parsed requirement into a resolver requirement; URL references
    /// are looked up in the index.
    pub fn make_requirement(&self, parsed: &ParsedRequirement) -> Result<Requirement> {
        let name = PackageName::new(&parsed.name);
        match &parsed.url {
            Some(url) => {
                let dist = self.index.fetch_url(&name, url)?;
                Ok(Requirement::explicit(Candidate::for_distribution(dist, &parsed.extras)))
            }
            None => Ok(Requirement::Specifier(SpecifierRequirement::from_parsed(parsed))),
        }
    }

    pub fn make_requirement_from_str(&self, text: &str) -> Result<Requirement> {
        let parsed = ParsedRequirement::parse(text)?;
        self.make_requirement(&parsed)
    }

    /// Candidates for `identifier`, best first.
    pub fn find_candidates(
        &self,
        identifier: &Identifier,
        requirements: &[&Requirement],
        incompatibilities: &[Candidate],
        prefers_installed: bool,
    ) -> Result<Vec<Candidate>> {
        match identifier {
            Identifier::Environment => {
                let candidate = Candidate::Environment(self.environment.clone());
                let usable = !incompatibilities.contains(&candidate)
                    && requirements.iter().all(|r| r.is_satisfied_by(&candidate));
                Ok(if usable { vec![candidate] } else { Vec::new() })
            }
            Identifier::Package { name, extras } => self.find_package_candidates(
                name,
                extras,
                requirements,
                incompatibilities,
                prefers_installed,
            ),
        }
    }

    fn find_package_candidates(
        &self,
        name: &PackageName,
        extras: &BTreeSet<String>,
        requirements: &[&Requirement],
        incompatibilities: &[Candidate],
        prefers_installed: bool,
    ) -> Result<Vec<Candidate>> {
        let constraint = self.constraints.get(name);
        let usable = |dist: &Arc<Distribution>| {
            let candidate = Candidate::for_distribution(Arc::clone(dist), extras);
            !incompatibilities.contains(&candidate)
                && requirements.iter().all(|r| r.is_satisfied_by(&candidate))
                && constraint.map_or(true, |c| c.contains(candidate.version(), true))
        };

        // Direct references admit exactly one distribution.
        let explicit: Vec<&Candidate> = requirements
            .iter()
            .filter_map(|r| r.explicit_candidate())
            .collect();
        if let Some(first) = explicit.first() {
            if explicit.iter().any(|c| c.base_key() != first.base_key()) {
                log::debug!("Conflicting direct references for {}", name);
                return Ok(Vec::new());
            }
            return Ok(first
                .distribution()
                .filter(|dist| usable(dist))
                .map(|dist| vec![Candidate::for_distribution(Arc::clone(dist), extras)])
                .unwrap_or_default());
        }

        let installed = self
            .index
            .installed(name)
            .filter(|dist| self.is_environment_compatible(dist) && usable(dist));

        let matching: Vec<Arc<Distribution>> = self
            .index
            .versions(name)?
            .into_iter()
            .filter(|dist| {
                installed
                    .as_ref()
                    .map_or(true, |i| i.version() != dist.version())
            })
            .filter(|dist| self.is_environment_compatible(dist) && usable(dist))
            .collect();

        let prereleases_requested = requirements
            .iter()
            .filter_map(|r| r.specifier_set())
            .chain(constraint)
            .any(SpecifierSet::mentions_prerelease);
        let mut matching = self.policy.filter_prereleases(matching, prereleases_requested);
        if let Some(dist) = &installed {
            matching.push(Arc::clone(dist));
        }

        let preferred = if prefers_installed { installed.as_ref() } else { None };
        let ranked = self.policy.select_preferred(matching, preferred);
        log::debug!("Found {} candidates for {}", ranked.len(), name);

        Ok(ranked
            .into_iter()
            .map(|dist| Candidate::for_distribution(dist, extras))
            .collect())
    }

    fn is_environment_compatible(&self, dist: &Distribution) -> bool {
        let spec = match dist.requires_environment() {
            Some(spec) => spec,
            None => return true,
        };
        match SpecifierSet::parse(spec) {
            Ok(set) => set.contains(&self.environment, true),
            Err(e) => {
                log::warn!("Ignoring {}: invalid environment requirement \"{}\": {}", dist, spec, e);
                false
            }
        }
    }

    /// Dependencies of a candidate.
    ///
    /// An extras candidate first depends on its own base distribution. With
    /// `with_requires` false only that link is kept.
    pub fn dependencies(&self, candidate: &Candidate, with_requires: bool) -> Result<Vec<Requirement>> {
        let key = (candidate.key(), with_requires);
        if let Some(cached) = self.dependency_cache.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let dependencies = self.expand(candidate, with_requires)?;
        self.dependency_cache
            .borrow_mut()
            .insert(key, dependencies.clone());
        Ok(dependencies)
    }

    fn expand(&self, candidate: &Candidate, with_requires: bool) -> Result<Vec<Requirement>> {
        match candidate {
            Candidate::Environment(_) => Ok(Vec::new()),
            Candidate::Concrete(dist) if with_requires => self.parse_requires(dist, dist.requires()),
            Candidate::Concrete(_) => Ok(Vec::new()),
            Candidate::Extras(ec) => {
                let base = ec.base();
                let mut dependencies = vec![Requirement::explicit(Candidate::Concrete(Arc::clone(base)))];
                if !with_requires {
                    return Ok(dependencies);
                }

                dependencies.extend(self.parse_requires(base, base.requires())?);
                for extra in ec.extras() {
                    match base.extra_requires(extra) {
                        Some(requires) => dependencies.extend(self.parse_requires(base, requires)?),
                        None => log::warn!("{} does not provide the extra '{}'", base, extra),
                    }
                }
                Ok(dependencies)
            }
        }
    }

    fn parse_requires(&self, dist: &Distribution, requires: &[String]) -> Result<Vec<Requirement>> {
        requires
            .iter()
            .map(|text| {
                let parsed = ParsedRequirement::parse(text).map_err(|e| Error::InvalidMetadata {
                    package: dist.to_string(),
                    reason: e.to_string(),
                })?;
                self.make_requirement(&parsed)
            })
            .collect()
    }
}
