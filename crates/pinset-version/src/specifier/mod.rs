//! Version specifiers and specifier sets

mod operator;
#[allow(clippy::module_inception)]
mod specifier;
mod specifier_set;

pub use operator::Operator;
pub use specifier::Specifier;
pub use specifier_set::SpecifierSet;
