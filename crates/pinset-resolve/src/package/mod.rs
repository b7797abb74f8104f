//! Package model: names, identifiers, distributions, candidates and requirements

mod candidate;
mod distribution;
mod name;
mod requirement;

pub use candidate::{Candidate, CandidateKey, ExtrasCandidate};
pub use distribution::{Distribution, Source};
pub use name::{Identifier, PackageName};
pub use requirement::{
    EnvironmentRequirement, ExplicitRequirement, Requirement, SpecifierRequirement,
};
