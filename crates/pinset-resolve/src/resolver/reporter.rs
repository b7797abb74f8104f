//! Observability hooks for the resolver.
//!
//! Reporters are notified as the search progresses; they never influence
//! the outcome.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::package::{Candidate, Identifier, Requirement};

use super::{Criterion, RequirementInformation, State};

/// Receives resolver progress events. Every method defaults to a no-op.
pub trait Reporter {
    /// Called before the resolution starts.
    fn starting(&self) {}

    /// Called before each round, with the zero-based round index.
    fn starting_round(&self, _index: usize) {}

    /// Called after a round completes, with the state after the round.
    fn ending_round(&self, _index: usize, _state: &State) {}

    /// Called once the resolution succeeded.
    fn ending(&self, _state: &State) {}

    /// Called when a requirement is merged into the criteria.
    ///
    /// `parent` is `None` for user requirements.
    fn adding_requirement(&self, _requirement: &Requirement, _parent: Option<&Candidate>) {}

    /// Called when the resolver starts backtracking because of `causes`.
    fn resolving_conflicts(&self, _causes: &[RequirementInformation]) {}

    /// Called when a candidate is rejected because it conflicts with `criterion`.
    fn rejecting_candidate(&self, _criterion: &Criterion, _candidate: &Candidate) {}

    /// Called when a candidate is pinned.
    fn pinning(&self, _candidate: &Candidate) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl Reporter for NoOpReporter {}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn starting(&self) {
        (**self).starting()
    }

    fn starting_round(&self, index: usize) {
        (**self).starting_round(index)
    }

    fn ending_round(&self, index: usize, state: &State) {
        (**self).ending_round(index, state)
    }

    fn ending(&self, state: &State) {
        (**self).ending(state)
    }

    fn adding_requirement(&self, requirement: &Requirement, parent: Option<&Candidate>) {
        (**self).adding_requirement(requirement, parent)
    }

    fn resolving_conflicts(&self, causes: &[RequirementInformation]) {
        (**self).resolving_conflicts(causes)
    }

    fn rejecting_candidate(&self, criterion: &Criterion, candidate: &Candidate) {
        (**self).rejecting_candidate(criterion, candidate)
    }

    fn pinning(&self, candidate: &Candidate) {
        (**self).pinning(candidate)
    }
}

const LOOKING_AT_MULTIPLE_VERSIONS: &str = "is looking at multiple versions";
const STILL_LOOKING: &str = "is still looking at multiple versions";

/// Reporter that writes progress through the `log` facade.
///
/// Every event is logged at debug level. When the same package keeps having
/// candidates rejected, an info-level hint is emitted after the 1st, 8th
/// and 13th rejection.
#[derive(Debug, Default)]
pub struct LoggingReporter {
    rejections: RefCell<HashMap<Identifier, usize>>,
}

impl LoggingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rejections seen so far for an identifier.
    pub fn rejection_count(&self, identifier: &Identifier) -> usize {
        self.rejections.borrow().get(identifier).copied().unwrap_or(0)
    }

    fn hint(count: usize, identifier: &Identifier) -> Option<String> {
        let message = match count {
            1 => format!(
                "Resolver {} of {} to determine which version is compatible with other requirements. This could take a while.",
                LOOKING_AT_MULTIPLE_VERSIONS, identifier
            ),
            8 => format!(
                "Resolver {} of {} to determine which version is compatible with other requirements. This could take a while.",
                STILL_LOOKING, identifier
            ),
            13 => "This is taking longer than usual. You might need to provide the dependency resolver with stricter constraints to reduce runtime.".to_string(),
            _ => return None,
        };
        Some(message)
    }
}

impl Reporter for LoggingReporter {
    fn starting(&self) {
        log::debug!("Resolution starting");
    }

    fn starting_round(&self, index: usize) {
        log::debug!("Round {} starting", index);
    }

    fn ending_round(&self, index: usize, state: &State) {
        log::debug!("Round {} ended with {} pins", index, state.mapping.len());
    }

    fn ending(&self, state: &State) {
        log::debug!("Resolution ended with {} pins", state.mapping.len());
    }

    fn adding_requirement(&self, requirement: &Requirement, parent: Option<&Candidate>) {
        match parent {
            Some(parent) => log::debug!("Adding requirement {} (from {})", requirement, parent),
            None => log::debug!("Adding requirement {} (requested)", requirement),
        }
    }

    fn resolving_conflicts(&self, causes: &[RequirementInformation]) {
        let causes: Vec<String> = causes.iter().map(|c| c.to_string()).collect();
        log::debug!("Resolving conflicts caused by: {}", causes.join(", "));
    }

    fn rejecting_candidate(&self, criterion: &Criterion, candidate: &Candidate) {
        let identifier = candidate.identifier().base();
        let count = {
            let mut rejections = self.rejections.borrow_mut();
            let count = rejections.entry(identifier.clone()).or_insert(0);
            *count += 1;
            *count
        };

        log::debug!("Rejecting {}: conflicts with {}", candidate, criterion);
        if let Some(message) = Self::hint(count, &identifier) {
            log::info!("{}", message);
        }
    }

    fn pinning(&self, candidate: &Candidate) {
        log::debug!("Pinning {}", candidate);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pinset_version::Version;

    use super::*;
    use crate::package::Distribution;

    #[test]
    fn test_rejections_counted_per_package() {
        let reporter = LoggingReporter::new();
        let criterion = Criterion::default();
        for version in ["1.0", "2.0", "3.0"] {
            let dist = Distribution::new("pkg", Version::parse(version).unwrap());
            let candidate = Candidate::for_distribution(Arc::new(dist), &["x".to_string()].into());
            reporter.rejecting_candidate(&criterion, &candidate);
        }

        assert_eq!(reporter.rejection_count(&Identifier::package("pkg")), 3);
        assert_eq!(reporter.rejection_count(&Identifier::package("other")), 0);
    }

    #[test]
    fn test_hints_at_thresholds() {
        let id = Identifier::package("pkg");
        assert!(LoggingReporter::hint(1, &id).unwrap().contains("looking at multiple versions of pkg"));
        assert!(LoggingReporter::hint(8, &id).unwrap().contains("still looking"));
        assert!(LoggingReporter::hint(13, &id).unwrap().contains("taking longer than usual"));
        assert!(LoggingReporter::hint(2, &id).is_none());
    }
}
