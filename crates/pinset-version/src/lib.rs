//! Package versions and version specifiers.
//!
//! This crate provides version parsing and ordering, specifier matching and a
//! small parser for textual requirements (`name[extra] >=1.0,<2`) as consumed
//! by the `pinset-resolve` resolution engine.

mod error;
mod requirement;
pub mod specifier;
mod version;

pub use error::ParseError;
pub use requirement::ParsedRequirement;
pub use specifier::{Operator, Specifier, SpecifierSet};
pub use version::{PreRelease, PreReleaseKind, Version};
