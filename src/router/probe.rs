//! Filesystem probes used by the resolver.

use std::fs;

/// The filesystem checks request resolution depends on.
///
/// Implementations must be cheap and side-effect free; the router calls them
/// synchronously and never retries.
pub trait Filesystem: Send + Sync {
    /// Returns whether anything exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Returns whether `path` is a directory.
    fn is_directory(&self, path: &str) -> bool;

    /// Returns whether the current process can read `path`.
    fn is_readable(&self, path: &str) -> bool;
}

/// Probes the local filesystem through `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &str) -> bool {
        fs::metadata(path).is_ok()
    }

    fn is_directory(&self, path: &str) -> bool {
        fs::metadata(path)
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    fn is_readable(&self, path: &str) -> bool {
        if self.is_directory(path) {
            fs::read_dir(path).is_ok()
        } else {
            fs::File::open(path).is_ok()
        }
    }
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        (**self).is_directory(path)
    }

    fn is_readable(&self, path: &str) -> bool {
        (**self).is_readable(path)
    }
}
