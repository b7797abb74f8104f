pub mod config;
pub mod error;
pub mod index;
pub mod lock;
pub mod package;
pub mod provider;
pub mod request;
pub mod resolver;
pub mod session;

pub use config::{ConfigLoader, ResolverConfig};
pub use error::{Error, Result};
pub use index::{InMemoryIndex, PackageIndex};
pub use lock::{LockedPackage, Lock};
pub use package::{
    Candidate, CandidateKey, Distribution, ExtrasCandidate, Identifier, PackageName, Requirement,
    Source,
};
pub use provider::{Factory, PackageProvider, Policy, Preference, RequestOrder, UpgradeStrategy};
pub use request::{Request, RootRequirement};
pub use resolver::{
    ConflictReport, Criterion, LoggingReporter, NoOpReporter, Provider, Reporter,
    RequirementInformation, ResolutionError, ResolutionResult, Resolver,
};
pub use session::resolve;
