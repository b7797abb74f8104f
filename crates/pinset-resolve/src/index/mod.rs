//! Package index: where candidate distributions come from

mod memory;

use std::sync::Arc;

pub use memory::{IndexDocument, InMemoryIndex, PackageRecord};

use crate::package::{Distribution, PackageName};
use crate::Result;

/// Read-only source of distributions.
pub trait PackageIndex {
    /// All known distributions of a package, in any order.
    ///
    /// Unknown packages yield an empty list rather than an error.
    fn versions(&self, name: &PackageName) -> Result<Vec<Arc<Distribution>>>;

    /// The distribution currently installed in the target environment.
    fn installed(&self, name: &PackageName) -> Option<Arc<Distribution>>;

    /// Resolve a direct URL or path reference to its distribution.
    fn fetch_url(&self, name: &PackageName, url: &str) -> Result<Arc<Distribution>>;
}

impl<T: PackageIndex + ?Sized> PackageIndex for &T {
    fn versions(&self, name: &PackageName) -> Result<Vec<Arc<Distribution>>> {
        (**self).versions(name)
    }

    fn installed(&self, name: &PackageName) -> Option<Arc<Distribution>> {
        (**self).installed(name)
    }

    fn fetch_url(&self, name: &PackageName, url: &str) -> Result<Arc<Distribution>> {
        (**self).fetch_url(name, url)
    }
}

impl<T: PackageIndex + ?Sized> PackageIndex for Arc<T> {
    fn versions(&self, name: &PackageName) -> Result<Vec<Arc<Distribution>>> {
        (**self).versions(name)
    }

    fn installed(&self, name: &PackageName) -> Option<Arc<Distribution>> {
        (**self).installed(name)
    }

    fn fetch_url(&self, name: &PackageName, url: &str) -> Result<Arc<Distribution>> {
        (**self).fetch_url(name, url)
    }
}
