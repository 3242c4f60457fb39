//! Utilities shared by jarguard tests.
//!
//! Tests never depend on a JDK: class files are assembled byte-by-byte with
//! [`ClassFileBuilder`] and packaged with [`JarBuilder`].

mod class_bytes;
mod jar;

pub use class_bytes::ClassFileBuilder;
pub use jar::{write_jar, JarBuilder};

/// A scratch directory laid out like a build's output: a current classpath
/// directory and a directory holding the previous build's snapshots.
pub struct BuildDirs {
    pub root: tempfile::TempDir,
}

impl BuildDirs {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(root.path().join("current")).expect("create current dir");
        std::fs::create_dir_all(root.path().join("previous")).expect("create previous dir");
        Self { root }
    }

    pub fn current(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join("current").join(name)
    }

    pub fn previous(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join("previous").join(name)
    }
}

impl Default for BuildDirs {
    fn default() -> Self {
        Self::new()
    }
}
