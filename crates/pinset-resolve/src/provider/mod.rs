//! The package provider: the resolver's view of an index

mod factory;
mod policy;
mod preference;

use std::collections::HashMap;

pub use factory::Factory;
pub use policy::{Policy, UpgradeStrategy};
pub use preference::{is_backtrack_cause, Preference, RequestOrder};

use crate::index::PackageIndex;
use crate::package::{Candidate, Identifier, Requirement};
use crate::resolver::{Criteria, Mapping, Provider, RequirementInformation};
use crate::Result;

/// [`Provider`] backed by a [`Factory`].
pub struct PackageProvider<I> {
    factory: Factory<I>,
    upgrade_strategy: UpgradeStrategy,
    ignore_dependencies: bool,
    user_requested: HashMap<Identifier, usize>,
}

impl<I: PackageIndex> PackageProvider<I> {
    /// `user_requested` maps each identifier the user asked for to its
    /// position in the request.
    pub fn new(
        factory: Factory<I>,
        upgrade_strategy: UpgradeStrategy,
        ignore_dependencies: bool,
        user_requested: HashMap<Identifier, usize>,
    ) -> Self {
        Self {
            factory,
            upgrade_strategy,
            ignore_dependencies,
            user_requested,
        }
    }

    pub fn factory(&self) -> &Factory<I> {
        &self.factory
    }

    fn requested_position(&self, identifier: &Identifier) -> Option<usize> {
        self.user_requested
            .get(identifier)
            .or_else(|| self.user_requested.get(&identifier.base()))
            .copied()
    }

    pub fn requested_order(&self, identifier: &Identifier) -> RequestOrder {
        match self.requested_position(identifier) {
            Some(position) => RequestOrder::Requested(position),
            None => RequestOrder::Unrequested,
        }
    }

    /// Whether a newer version should be preferred over an installed one.
    fn is_eligible_for_upgrade(&self, identifier: &Identifier) -> bool {
        match self.upgrade_strategy {
            UpgradeStrategy::Eager => true,
            UpgradeStrategy::OnlyIfNeeded => self.requested_position(identifier).is_some(),
            UpgradeStrategy::ToSatisfyOnly => false,
        }
    }
}

impl<I: PackageIndex> Provider for PackageProvider<I> {
    type Preference = Preference;

    fn get_preference(
        &self,
        identifier: &Identifier,
        _resolutions: &Mapping,
        criteria: &Criteria,
        backtrack_causes: &[RequirementInformation],
    ) -> Preference {
        let information: &[RequirementInformation] = criteria
            .get(identifier)
            .map(|criterion| criterion.information())
            .unwrap_or(&[]);
        Preference::new(
            identifier,
            information,
            backtrack_causes,
            self.requested_order(identifier),
        )
    }

    fn find_matches(
        &self,
        identifier: &Identifier,
        requirements: &[&Requirement],
        incompatibilities: &[Candidate],
    ) -> Result<Vec<Candidate>> {
        self.factory.find_candidates(
            identifier,
            requirements,
            incompatibilities,
            !self.is_eligible_for_upgrade(identifier),
        )
    }

    fn is_satisfied_by(&self, requirement: &Requirement, candidate: &Candidate) -> bool {
        requirement.is_satisfied_by(candidate)
    }

    fn get_dependencies(&self, candidate: &Candidate) -> Result<Vec<Requirement>> {
        self.factory.dependencies(candidate, !self.ignore_dependencies)
    }
}
