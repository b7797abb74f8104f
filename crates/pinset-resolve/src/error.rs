use thiserror::Error;

use crate::resolver::ResolutionError;

#[derive(Error, Debug)]
pub enum Error {
    // Parsing errors
    #[error("Invalid requirement: {0}")]
    InvalidRequirement(#[from] pinset_version::ParseError),

    #[error("Invalid metadata for {package}: {reason}")]
    InvalidMetadata { package: String, reason: String },

    // Index errors
    #[error("Package not found: {name}")]
    PackageNotFound { name: String },

    #[error("No distribution of {name} found at {url}")]
    UrlNotFound { name: String, url: String },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Resolver errors
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

pub type Result<T> = std::result::Result<T, Error>;
