use crate::package::{Candidate, Identifier, Requirement};
use crate::Result;

use super::{Criteria, Mapping, RequirementInformation};

/// Decision logic consulted by the resolver.
///
/// Implementations must be deterministic: the same inputs have to produce
/// the same outputs for the whole lifetime of a resolution.
pub trait Provider {
    /// Sort key; the resolver works on the identifier with the smallest one.
    type Preference: Ord;

    /// Rank an unsatisfied identifier against the others.
    fn get_preference(
        &self,
        identifier: &Identifier,
        resolutions: &Mapping,
        criteria: &Criteria,
        backtrack_causes: &[RequirementInformation],
    ) -> Self::Preference;

    /// Candidates for `identifier` that satisfy every requirement and are
    /// not listed in `incompatibilities`, most preferred first.
    fn find_matches(
        &self,
        identifier: &Identifier,
        requirements: &[&Requirement],
        incompatibilities: &[Candidate],
    ) -> Result<Vec<Candidate>>;

    fn is_satisfied_by(&self, requirement: &Requirement, candidate: &Candidate) -> bool;

    /// Dependencies of a candidate; must not change between calls.
    fn get_dependencies(&self, candidate: &Candidate) -> Result<Vec<Requirement>>;
}
