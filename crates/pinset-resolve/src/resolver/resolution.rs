use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::package::{Candidate, CandidateKey, Identifier, Requirement};

use super::{
    ConflictReport, Criterion, Provider, Reporter, RequirementInformation, ResolutionError,
    ResolutionResult,
};

/// Pinned candidates, in pin order.
pub type Mapping = IndexMap<Identifier, Candidate>;

/// Criteria by identifier, in order of first mention.
pub type Criteria = IndexMap<Identifier, Arc<Criterion>>;

/// A snapshot of the search.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub mapping: Mapping,
    pub criteria: Criteria,
    pub backtrack_causes: Vec<RequirementInformation>,
}

/// Outcome of merging requirements into criteria.
enum MergeError {
    /// The merge left an identifier without candidates, or broke a pin
    Conflict(Criterion),
    Fatal(ResolutionError),
}

impl From<ResolutionError> for MergeError {
    fn from(error: ResolutionError) -> Self {
        MergeError::Fatal(error)
    }
}

/// Outcome of unwinding snapshots after a conflict.
enum Unwind {
    /// A pin was marked incompatible and the restored state still has candidates
    Patched,
    /// No snapshot could be patched; `skipped` tells whether unrelated pins
    /// were passed over on the way down
    Exhausted { skipped: bool },
}

/// Entry point of the backtracking search.
pub struct Resolver<P, R> {
    provider: P,
    reporter: R,
}

impl<P: Provider, R: Reporter> Resolver<P, R> {
    pub fn new(provider: P, reporter: R) -> Self {
        Self { provider, reporter }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Resolve root requirements into a consistent set of pins.
    ///
    /// At most `max_rounds` rounds are attempted before giving up with
    /// [`ResolutionError::TooDeep`].
    pub fn resolve(
        &self,
        requirements: impl IntoIterator<Item = Requirement>,
        max_rounds: usize,
    ) -> Result<ResolutionResult, ResolutionError> {
        let start = std::time::Instant::now();
        let mut resolution = Resolution::new(&self.provider, &self.reporter);
        let outcome = resolution.resolve(requirements, max_rounds);

        match &outcome {
            Ok(state) => log::info!(
                "Dependency resolution completed in {:.3} seconds ({} rounds, {} pins)",
                start.elapsed().as_secs_f64(),
                resolution.rounds,
                state.mapping.len()
            ),
            Err(error) => log::debug!(
                "Dependency resolution failed after {} rounds in {:?}: {}",
                resolution.rounds,
                start.elapsed(),
                error
            ),
        }

        outcome.map(ResolutionResult::from_state)
    }
}

/// One run of the search.
///
/// `snapshots` holds committed states, oldest first; `state` is the working
/// copy on top of them.
struct Resolution<'a, P, R> {
    provider: &'a P,
    reporter: &'a R,
    state: State,
    snapshots: Vec<State>,
    fingerprints: HashMap<CandidateKey, u64>,
    rounds: usize,
}

impl<'a, P: Provider, R: Reporter> Resolution<'a, P, R> {
    fn new(provider: &'a P, reporter: &'a R) -> Self {
        Self {
            provider,
            reporter,
            state: State::default(),
            snapshots: Vec::new(),
            fingerprints: HashMap::new(),
            rounds: 0,
        }
    }

    fn resolve(
        &mut self,
        requirements: impl IntoIterator<Item = Requirement>,
        max_rounds: usize,
    ) -> Result<State, ResolutionError> {
        self.reporter.starting();

        let mut root = State::default();
        for requirement in requirements {
            self.reporter.adding_requirement(&requirement, None);
            match self.add_to_criteria(&mut root.criteria, requirement, None) {
                Ok(()) => {}
                Err(MergeError::Conflict(criterion)) => {
                    return Err(ResolutionError::Impossible(ConflictReport::new(
                        criterion.information().to_vec(),
                    )));
                }
                Err(MergeError::Fatal(error)) => return Err(error),
            }
        }
        log::debug!("Starting resolution with {} root criteria", root.criteria.len());

        self.state = root.clone();
        self.snapshots = vec![root];

        for round in 0..max_rounds {
            self.rounds = round + 1;
            self.reporter.starting_round(round);

            let name = match self.next_identifier() {
                Some(name) => name,
                None => {
                    self.reporter.ending(&self.state);
                    return Ok(std::mem::take(&mut self.state));
                }
            };
            log::debug!("Round {}: resolving {}", round, name);

            let failure_criteria = self.attempt_to_pin_criterion(&name)?;

            if failure_criteria.is_empty() {
                self.snapshots.push(self.state.clone());
            } else {
                let causes: Vec<RequirementInformation> = failure_criteria
                    .iter()
                    .flat_map(|criterion| criterion.information().iter().cloned())
                    .collect();
                self.reporter.resolving_conflicts(&causes);

                let success = self.backjump(&causes)?;
                self.state.backtrack_causes = causes;
                if !success {
                    return Err(ResolutionError::Impossible(ConflictReport::new(
                        self.state.backtrack_causes.clone(),
                    )));
                }
            }

            self.reporter.ending_round(round, &self.state);
        }

        Err(ResolutionError::TooDeep { max_rounds })
    }

    /// The unsatisfied identifier with the smallest preference, if any.
    fn next_identifier(&self) -> Option<Identifier> {
        let state = &self.state;
        state
            .criteria
            .iter()
            .filter(|(identifier, criterion)| !self.is_current_pin_satisfying(identifier, criterion))
            .map(|(identifier, _)| identifier)
            .min_by_key(|identifier| {
                self.provider.get_preference(
                    identifier,
                    &state.mapping,
                    &state.criteria,
                    &state.backtrack_causes,
                )
            })
            .cloned()
    }

    fn is_current_pin_satisfying(&self, identifier: &Identifier, criterion: &Criterion) -> bool {
        match self.state.mapping.get(identifier) {
            Some(pin) => criterion
                .iter_requirement()
                .all(|requirement| self.provider.is_satisfied_by(requirement, pin)),
            None => false,
        }
    }

    /// Merge one requirement into `criteria`, narrowing the candidate pool.
    fn add_to_criteria(
        &self,
        criteria: &mut Criteria,
        requirement: Requirement,
        parent: Option<CandidateKey>,
    ) -> Result<(), MergeError> {
        let identifier = requirement.identifier();
        let (mut information, incompatibilities) = match criteria.get(&identifier) {
            Some(existing) => (
                existing.information().to_vec(),
                existing.incompatibilities().to_vec(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        information.push(RequirementInformation::new(requirement, parent));

        let matches = {
            let requirements: Vec<&Requirement> =
                information.iter().map(|info| info.requirement.as_ref()).collect();
            self.provider
                .find_matches(&identifier, &requirements, &incompatibilities)
                .map_err(ResolutionError::provider)?
        };

        let criterion = Criterion::new(matches, information, incompatibilities);
        if criterion.is_empty() {
            return Err(MergeError::Conflict(criterion));
        }
        criteria.insert(identifier, Arc::new(criterion));
        Ok(())
    }

    /// Ask the provider for dependencies and check they did not change since
    /// the last time this candidate was expanded.
    fn dependencies_of(&mut self, candidate: &Candidate) -> Result<Vec<Requirement>, ResolutionError> {
        let dependencies = self
            .provider
            .get_dependencies(candidate)
            .map_err(ResolutionError::provider)?;

        let mut hasher = DefaultHasher::new();
        dependencies.hash(&mut hasher);
        let fingerprint = hasher.finish();

        match self.fingerprints.entry(candidate.key()) {
            Entry::Occupied(entry) if *entry.get() != fingerprint => {
                Err(ResolutionError::NonDeterministicDependencies {
                    candidate: candidate.clone(),
                })
            }
            Entry::Occupied(_) => Ok(dependencies),
            Entry::Vacant(entry) => {
                entry.insert(fingerprint);
                Ok(dependencies)
            }
        }
    }

    /// Criteria after adding the dependencies of `candidate`, pinned for `name`.
    fn get_updated_criteria(
        &mut self,
        name: &Identifier,
        candidate: &Candidate,
    ) -> Result<Criteria, MergeError> {
        let mut criteria = self.state.criteria.clone();
        let parent = candidate.key();

        for requirement in self.dependencies_of(candidate)? {
            self.reporter.adding_requirement(&requirement, Some(candidate));
            let identifier = requirement.identifier();
            self.add_to_criteria(&mut criteria, requirement, Some(parent.clone()))?;

            // A dependency on something already pinned must keep that pin valid.
            let pin = if &identifier == name {
                Some(candidate)
            } else {
                self.state.mapping.get(&identifier)
            };
            if let (Some(pin), Some(updated)) = (pin, criteria.get(&identifier)) {
                let consistent = updated
                    .iter_requirement()
                    .all(|requirement| self.provider.is_satisfied_by(requirement, pin));
                if !consistent {
                    return Err(MergeError::Conflict(updated.as_ref().clone()));
                }
            }
        }

        Ok(criteria)
    }

    /// Try the candidates of one criterion in order and pin the first that
    /// works. Returns the criteria that caused every candidate to fail.
    fn attempt_to_pin_criterion(&mut self, name: &Identifier) -> Result<Vec<Criterion>, ResolutionError> {
        let criterion = match self.state.criteria.get(name) {
            Some(criterion) => Arc::clone(criterion),
            None => return Ok(Vec::new()),
        };
        if criterion.is_empty() {
            return Ok(vec![criterion.as_ref().clone()]);
        }

        let mut causes = Vec::new();
        for candidate in criterion.candidates() {
            if let Some(requirement) = criterion
                .iter_requirement()
                .find(|requirement| !self.provider.is_satisfied_by(requirement, candidate))
            {
                return Err(ResolutionError::InconsistentCandidate {
                    candidate: candidate.clone(),
                    requirement: requirement.clone(),
                });
            }

            match self.get_updated_criteria(name, candidate) {
                Ok(criteria) => {
                    self.reporter.pinning(candidate);
                    self.state.criteria = criteria;
                    self.state.mapping.shift_remove(name);
                    self.state.mapping.insert(name.clone(), candidate.clone());
                    return Ok(Vec::new());
                }
                Err(MergeError::Conflict(conflict)) => {
                    log::debug!("Rejected {}: {}", candidate, conflict);
                    self.reporter.rejecting_candidate(&conflict, candidate);
                    self.state.backtrack_causes = conflict.information().to_vec();
                    causes.push(conflict);
                }
                Err(MergeError::Fatal(error)) => return Err(error),
            }
        }

        Ok(causes)
    }

    /// Unwind to the most recent pin implicated by `causes` and mark it as
    /// incompatible. Returns false when nothing is left to unwind.
    ///
    /// Skipping pins that are not implicated can pass over the pin whose
    /// change would have led to a solution. When that jump runs out of
    /// snapshots, the search is retried from the same point one pin at a
    /// time.
    fn backjump(&mut self, causes: &[RequirementInformation]) -> Result<bool, ResolutionError> {
        let implicated: HashSet<Identifier> = causes
            .iter()
            .flat_map(|cause| {
                let parent = cause.parent.as_ref().map(|p| p.identifier.clone());
                parent.into_iter().chain(std::iter::once(cause.requirement.identifier()))
            })
            .collect();

        let saved = self.snapshots.clone();
        match self.unwind(Some(&implicated))? {
            Unwind::Patched => Ok(true),
            Unwind::Exhausted { skipped: false } => Ok(false),
            Unwind::Exhausted { skipped: true } => {
                log::debug!("Backjumping exhausted the search, backtracking one pin at a time");
                self.snapshots = saved;
                Ok(matches!(self.unwind(None)?, Unwind::Patched))
            }
        }
    }

    /// Pop snapshots until a pin can be marked incompatible in the state
    /// below it. With `implicated` set, pins unrelated to it are popped
    /// without being marked.
    fn unwind(&mut self, implicated: Option<&HashSet<Identifier>>) -> Result<Unwind, ResolutionError> {
        let mut skipped = false;

        // The first snapshot holds only the root criteria and is never unwound.
        while self.snapshots.len() >= 2 {
            let (name, candidate, broken) = loop {
                let mut broken = match self.snapshots.pop() {
                    Some(state) => state,
                    None => return Ok(Unwind::Exhausted { skipped }),
                };
                let (name, candidate) = match broken.mapping.pop() {
                    Some(pin) => pin,
                    None => return Ok(Unwind::Exhausted { skipped }),
                };

                let implicated = match implicated {
                    Some(implicated) => implicated,
                    None => break (name, candidate, broken),
                };
                if implicated.contains(&name) || broken.mapping.is_empty() {
                    break (name, candidate, broken);
                }
                let touches_cause = self
                    .dependencies_of(&candidate)?
                    .iter()
                    .any(|dependency| implicated.contains(&dependency.identifier()));
                if touches_cause {
                    break (name, candidate, broken);
                }
                log::debug!("Unwinding {} (not implicated)", candidate);
                skipped = true;
            };
            log::debug!("Backjumping past {}", candidate);

            let mut incompatibilities: Vec<(Identifier, Vec<Candidate>)> = broken
                .criteria
                .iter()
                .map(|(identifier, criterion)| {
                    (identifier.clone(), criterion.incompatibilities().to_vec())
                })
                .collect();
            incompatibilities.push((name, vec![candidate]));

            self.state = match self.snapshots.last() {
                Some(base) => base.clone(),
                None => return Ok(Unwind::Exhausted { skipped }),
            };

            if self.patch_criteria(incompatibilities)? {
                return Ok(Unwind::Patched);
            }
        }

        Ok(Unwind::Exhausted { skipped })
    }

    /// Re-derive candidate pools with the given incompatibilities excluded.
    /// Returns false if any pool becomes empty.
    fn patch_criteria(
        &mut self,
        incompatibilities: Vec<(Identifier, Vec<Candidate>)>,
    ) -> Result<bool, ResolutionError> {
        for (identifier, mut excluded) in incompatibilities {
            if excluded.is_empty() {
                continue;
            }
            let criterion = match self.state.criteria.get(&identifier) {
                Some(criterion) => Arc::clone(criterion),
                None => continue,
            };
            for candidate in criterion.incompatibilities() {
                if !excluded.contains(candidate) {
                    excluded.push(candidate.clone());
                }
            }

            let matches = {
                let requirements: Vec<&Requirement> = criterion.iter_requirement().collect();
                self.provider
                    .find_matches(&identifier, &requirements, &excluded)
                    .map_err(ResolutionError::provider)?
            };
            if matches.is_empty() {
                return Ok(false);
            }

            self.state.criteria.insert(
                identifier,
                Arc::new(Criterion::new(matches, criterion.information().to_vec(), excluded)),
            );
        }
        Ok(true)
    }
}
