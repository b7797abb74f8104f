use std::fmt;

use crate::package::Identifier;

use super::RequirementInformation;

/// The requirements responsible for a failed resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    causes: Vec<RequirementInformation>,
}

impl ConflictReport {
    /// Build a report, dropping repeated causes while keeping their order.
    pub fn new(causes: impl IntoIterator<Item = RequirementInformation>) -> Self {
        let mut unique: Vec<RequirementInformation> = Vec::new();
        for cause in causes {
            if !unique.contains(&cause) {
                unique.push(cause);
            }
        }
        Self { causes: unique }
    }

    pub fn causes(&self) -> &[RequirementInformation] {
        &self.causes
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Causes that constrain the given identifier.
    pub fn causes_for<'a>(
        &'a self,
        identifier: &'a Identifier,
    ) -> impl Iterator<Item = &'a RequirementInformation> + 'a {
        self.causes
            .iter()
            .filter(move |cause| &cause.requirement.identifier() == identifier)
    }

    /// Generate a human-readable description of the conflict
    pub fn describe(&self) -> String {
        let lines: Vec<String> = self
            .causes
            .iter()
            .map(|cause| format!("    {}", describe_cause(cause)))
            .collect();

        format!(
            "Cannot resolve the requested packages because of conflicting dependencies.\n\nThe conflict is caused by:\n{}",
            lines.join("\n")
        )
    }
}

fn describe_cause(cause: &RequirementInformation) -> String {
    match &cause.parent {
        None => format!("The user requested {}", cause.requirement),
        Some(parent) => format!("{} depends on {}", parent, cause.requirement),
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
