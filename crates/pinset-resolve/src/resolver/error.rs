use thiserror::Error;

use crate::package::{Candidate, Requirement};

use super::ConflictReport;

/// Why a resolution did not produce a result.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The search space was exhausted
    #[error("{0}")]
    Impossible(ConflictReport),

    /// The round budget ran out before a decision was reached
    #[error("Dependency resolution exceeded maximum depth of {max_rounds} rounds")]
    TooDeep { max_rounds: usize },

    #[error("Provider returned candidate {candidate} which does not satisfy {requirement}")]
    InconsistentCandidate {
        candidate: Candidate,
        requirement: Requirement,
    },

    #[error("Dependencies of {candidate} changed between queries")]
    NonDeterministicDependencies { candidate: Candidate },

    #[error("Provider failed: {0}")]
    Provider(#[source] Box<crate::Error>),
}

impl ResolutionError {
    pub fn provider(error: crate::Error) -> Self {
        ResolutionError::Provider(Box::new(error))
    }

    /// The conflict report, when the failure is a genuine impossibility.
    pub fn conflict(&self) -> Option<&ConflictReport> {
        match self {
            ResolutionError::Impossible(report) => Some(report),
            _ => None,
        }
    }
}
