//! Backtracking dependency resolver
//!
//! The resolver repeatedly picks the most preferred unsatisfied identifier,
//! pins the first candidate that is consistent with everything known so far,
//! merges that candidate's dependencies into the criteria, and on failure
//! unwinds to the most recent implicated pin.

mod criterion;
mod error;
mod provider;
mod report;
mod reporter;
mod resolution;
mod result;


pub use criterion::{Criterion, RequirementInformation};
pub use error::ResolutionError;
pub use provider::Provider;
pub use report::ConflictReport;
pub use reporter::{LoggingReporter, NoOpReporter, Reporter};
pub use resolution::{Criteria, Mapping, Resolver, State};
pub use result::{DependencyGraph, ResolutionResult};
