mod parser;

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::router::Filesystem;

/// In-memory filesystem that counts how often it is probed.
#[derive(Default)]
pub(crate) struct MemoryFilesystem {
    files: HashSet<String>,
    directories: HashSet<String>,
    unreadable: HashSet<String>,
    probes: AtomicUsize,
}

impl MemoryFilesystem {
    pub(crate) fn file(mut self, path: &str) -> Self {
        self.files
            .insert(path.to_string());
        self
    }

    pub(crate) fn directory(mut self, path: &str) -> Self {
        self.directories
            .insert(path.to_string());
        self
    }

    pub(crate) fn unreadable(mut self, path: &str) -> Self {
        self.unreadable
            .insert(path.to_string());
        self
    }

    pub(crate) fn probes(&self) -> usize {
        self.probes
            .load(Ordering::SeqCst)
    }

    fn probe(&self) {
        self.probes
            .fetch_add(1, Ordering::SeqCst);
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &str) -> bool {
        self.probe();
        self.files
            .contains(path)
            || self
                .directories
                .contains(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        self.probe();
        self.directories
            .contains(path)
    }

    fn is_readable(&self, path: &str) -> bool {
        self.probe();
        self.exists(path)
            && !self
                .unreadable
                .contains(path)
    }
}
