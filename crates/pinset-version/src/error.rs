use thiserror::Error;

/// Errors produced while parsing versions, specifiers and requirements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid version \"{0}\"")]
    InvalidVersion(String),

    #[error("Invalid operator \"{0}\"")]
    InvalidOperator(String),

    #[error("Invalid specifier \"{specifier}\": {reason}")]
    InvalidSpecifier { specifier: String, reason: String },

    #[error("Invalid requirement \"{requirement}\": {reason}")]
    InvalidRequirement { requirement: String, reason: String },
}
