use crate::package::Identifier;
use crate::resolver::RequirementInformation;

/// Position of an identifier among the user's requirements.
///
/// `Requested(n)` sorts before `Unrequested`, and requested identifiers
/// sort by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestOrder {
    Requested(usize),
    Unrequested,
}

/// Sort key deciding which identifier the resolver works on next.
///
/// Fields compare in declaration order and `false` sorts first, so every
/// flag is phrased as "not X" for a property X that should go first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Preference {
    pub not_environment: bool,
    pub not_direct: bool,
    pub not_pinned: bool,
    pub not_backtrack_cause: bool,
    pub requested_order: RequestOrder,
    pub is_free: bool,
    pub identifier: Identifier,
}

impl Preference {
    /// Compute the key from the requirements on `identifier`.
    ///
    /// Only version specifiers count towards pinned and free; a direct
    /// reference is tracked separately.
    pub fn new(
        identifier: &Identifier,
        information: &[RequirementInformation],
        backtrack_causes: &[RequirementInformation],
        requested_order: RequestOrder,
    ) -> Self {
        let mut direct = false;
        let mut pinned = false;
        let mut unfree = false;
        for info in information {
            let requirement = info.requirement.as_ref();
            direct |= requirement.is_direct();
            pinned |= requirement.is_pinned();
            unfree |= !requirement.is_free();
        }

        Self {
            not_environment: !identifier.is_environment(),
            not_direct: !direct,
            not_pinned: !pinned,
            not_backtrack_cause: !is_backtrack_cause(identifier, backtrack_causes),
            requested_order,
            is_free: !unfree,
            identifier: identifier.clone(),
        }
    }
}

/// An identifier is a backtrack cause if a cause requires it or was
/// required by it.
pub fn is_backtrack_cause(identifier: &Identifier, backtrack_causes: &[RequirementInformation]) -> bool {
    backtrack_causes.iter().any(|cause| {
        &cause.requirement.identifier() == identifier
            || cause
                .parent
                .as_ref()
                .is_some_and(|parent| &parent.identifier == identifier)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pinset_version::{ParsedRequirement, Version};

    use super::*;
    use crate::package::{Candidate, CandidateKey, Distribution, Requirement, SpecifierRequirement};

    fn info(text: &str) -> RequirementInformation {
        let parsed = ParsedRequirement::parse(text).unwrap();
        RequirementInformation::new(
            Requirement::Specifier(SpecifierRequirement::from_parsed(&parsed)),
            None,
        )
    }

    fn key(
        not_environment: bool,
        not_direct: bool,
        not_pinned: bool,
        not_backtrack_cause: bool,
        requested_order: RequestOrder,
        is_free: bool,
        identifier: Identifier,
    ) -> Preference {
        Preference {
            not_environment,
            not_direct,
            not_pinned,
            not_backtrack_cause,
            requested_order,
            is_free,
            identifier,
        }
    }

    use RequestOrder::Unrequested;

    #[test]
    fn test_environment() {
        let id = Identifier::Environment;
        let information = vec![RequirementInformation::new(
            Requirement::environment(Default::default()),
            None,
        )];
        assert_eq!(
            Preference::new(&id, &information, &[], Unrequested),
            key(false, true, true, true, Unrequested, true, id)
        );
    }

    #[test]
    fn test_pinned_package() {
        let id = Identifier::package("pinned-package");
        assert_eq!(
            Preference::new(&id, &[info("pinned-package==1.0")], &[], Unrequested),
            key(true, true, false, true, Unrequested, false, id)
        );
    }

    #[test]
    fn test_star_specified_package() {
        let id = Identifier::package("star-specified-package");
        assert_eq!(
            Preference::new(&id, &[info("star-specified-package==1.*")], &[], Unrequested),
            key(true, true, true, true, Unrequested, false, id)
        );
    }

    #[test]
    fn test_backtrack_package() {
        let id = Identifier::package("backtrack-package");
        let causes = [info("backtrack-package")];
        assert_eq!(
            Preference::new(&id, &[info("backtrack-package")], &causes, Unrequested),
            key(true, true, true, false, Unrequested, true, id)
        );
    }

    #[test]
    fn test_root_package() {
        let id = Identifier::package("root-package");
        assert_eq!(
            Preference::new(&id, &[info("root-package")], &[], RequestOrder::Requested(1)),
            key(true, true, true, true, RequestOrder::Requested(1), true, id)
        );
    }

    #[test]
    fn test_unfree_package() {
        let id = Identifier::package("unfree-package");
        assert_eq!(
            Preference::new(&id, &[info("unfree-package<1")], &[], Unrequested),
            key(true, true, true, true, Unrequested, false, id)
        );
    }

    #[test]
    fn test_free_package() {
        let id = Identifier::package("free-package");
        assert_eq!(
            Preference::new(&id, &[info("free-package")], &[], Unrequested),
            key(true, true, true, true, Unrequested, true, id)
        );
    }

    #[test]
    fn test_direct_package() {
        let id = Identifier::package("direct-package");
        let dist = Distribution::new("direct-package", Version::parse("1.0").unwrap())
            .with_source(crate::package::Source::Url("https://example.com/direct".into()));
        let information = vec![RequirementInformation::new(
            Requirement::explicit(Candidate::Concrete(Arc::new(dist))),
            None,
        )];
        assert_eq!(
            Preference::new(&id, &information, &[], Unrequested),
            key(true, false, true, true, Unrequested, true, id)
        );
    }

    #[test]
    fn test_backtrack_cause_sorts_first() {
        let a = Identifier::package("a");
        let b = Identifier::package("b");
        let causes = [info("b>=1")];
        let pa = Preference::new(&a, &[info("a>=1")], &causes, Unrequested);
        let pb = Preference::new(&b, &[info("b>=1")], &causes, Unrequested);
        assert!(pb < pa);
    }

    #[test]
    fn test_parent_of_cause_is_implicated() {
        let parent = CandidateKey {
            identifier: Identifier::package("a"),
            version: Version::parse("1.0").unwrap(),
            source: None,
        };
        let parsed = ParsedRequirement::parse("b==1").unwrap();
        let cause = RequirementInformation::new(
            Requirement::Specifier(SpecifierRequirement::from_parsed(&parsed)),
            Some(parent),
        );
        assert!(is_backtrack_cause(&Identifier::package("a"), &[cause.clone()]));
        assert!(is_backtrack_cause(&Identifier::package("b"), &[cause.clone()]));
        assert!(!is_backtrack_cause(&Identifier::package("c"), &[cause]));
    }

    #[test]
    fn test_requested_order() {
        let one = Preference::new(&Identifier::package("z"), &[info("z")], &[], RequestOrder::Requested(1));
        let five = Preference::new(&Identifier::package("a"), &[info("a")], &[], RequestOrder::Requested(5));
        let none = Preference::new(&Identifier::package("b"), &[info("b")], &[], Unrequested);
        assert!(one < five);
        assert!(five < none);
    }

    #[test]
    fn test_environment_sorts_before_direct() {
        let env = Preference::new(
            &Identifier::Environment,
            &[RequirementInformation::new(Requirement::environment(Default::default()), None)],
            &[],
            Unrequested,
        );
        let pinned = Preference::new(&Identifier::package("a"), &[info("a==1")], &[], RequestOrder::Requested(0));
        assert!(env < pinned);
    }
}
