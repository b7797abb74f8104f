//! Resolving a request against an index

use crate::config::ResolverConfig;
use crate::index::PackageIndex;
use crate::package::Requirement;
use crate::provider::{Factory, PackageProvider};
use crate::request::Request;
use crate::resolver::{Reporter, ResolutionError, ResolutionResult, Resolver};
use crate::{Error, Result};

/// Resolve `request` against `index`.
///
/// Provider failures (a broken index, invalid metadata) are returned as the
/// underlying error; everything else surfaces as [`Error::Resolution`].
pub fn resolve<I, R>(
    index: I,
    request: &Request,
    config: &ResolverConfig,
    reporter: R,
) -> Result<ResolutionResult>
where
    I: PackageIndex,
    R: Reporter,
{
    let factory = Factory::new(index, request.environment_version.clone(), config.policy())
        .with_constraints(request.parsed_constraints()?);

    let mut roots = vec![Requirement::environment(request.environment_specifier()?)];
    for (parsed, _) in request.parsed_requires()? {
        roots.push(factory.make_requirement(&parsed)?);
    }
    log::debug!(
        "Resolving {} root requirements (upgrade strategy {})",
        roots.len() - 1,
        config.upgrade_strategy
    );

    let provider = PackageProvider::new(
        factory,
        config.upgrade_strategy,
        config.ignore_dependencies,
        request.user_requested()?,
    );
    let resolver = Resolver::new(provider, reporter);

    match resolver.resolve(roots, config.max_rounds) {
        Ok(result) => Ok(result),
        Err(ResolutionError::Provider(error)) => Err(*error),
        Err(error) => Err(Error::Resolution(error)),
    }
}
