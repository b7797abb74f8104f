use std::fmt;
use std::sync::Arc;

use crate::package::{Candidate, CandidateKey, Requirement};

/// A requirement together with the candidate that introduced it.
///
/// `parent` is `None` for requirements given by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementInformation {
    pub requirement: Arc<Requirement>,
    pub parent: Option<CandidateKey>,
}

impl RequirementInformation {
    pub fn new(requirement: impl Into<Arc<Requirement>>, parent: Option<CandidateKey>) -> Self {
        Self {
            requirement: requirement.into(),
            parent,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for RequirementInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{} (from {})", self.requirement, parent),
            None => write!(f, "{} (requested)", self.requirement),
        }
    }
}

/// Everything known about one identifier: who asks for it, which candidates
/// are still possible, and which were ruled out by backtracking.
#[derive(Debug, Clone, Default)]
pub struct Criterion {
    candidates: Vec<Candidate>,
    information: Vec<RequirementInformation>,
    incompatibilities: Vec<Candidate>,
}

impl Criterion {
    pub fn new(
        candidates: Vec<Candidate>,
        information: Vec<RequirementInformation>,
        incompatibilities: Vec<Candidate>,
    ) -> Self {
        Self {
            candidates,
            information,
            incompatibilities,
        }
    }

    /// Candidates consistent with every requirement, best first.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn information(&self) -> &[RequirementInformation] {
        &self.information
    }

    pub fn incompatibilities(&self) -> &[Candidate] {
        &self.incompatibilities
    }

    pub fn iter_requirement(&self) -> impl Iterator<Item = &Requirement> {
        self.information.iter().map(|info| info.requirement.as_ref())
    }

    pub fn iter_parent(&self) -> impl Iterator<Item = Option<&CandidateKey>> {
        self.information.iter().map(|info| info.parent.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requirements: Vec<String> = self.information.iter().map(|i| i.to_string()).collect();
        write!(f, "Criterion({})", requirements.join(", "))
    }
}
