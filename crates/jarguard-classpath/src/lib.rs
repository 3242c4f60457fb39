//! Classpath snapshots and isolated class loading.
//!
//! A [`ResourceSet`] is one side (previous or current) of a classpath. A
//! [`ClassLoadingContext`] resolves classes against exactly one resource set
//! and keeps its own cache of parsed classes and open archive handles, so two
//! contexts can hold two different definitions of the same qualified name at
//! the same time.

mod context;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use jarguard_archive::ArchiveError;

pub use context::{ClassLoadingContext, LoadedClass};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("class {name} not found on the {context} classpath")]
    ClassNotFound { name: String, context: String },
    #[error("{path} defines {found}, expected {expected}")]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("malformed class {name} in {path}: {source}")]
    ClassFile {
        name: String,
        path: PathBuf,
        #[source]
        source: jarguard_classfile::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    /// Classifies a path the way a JVM URL class loader would: directories
    /// are class roots, anything else is treated as an archive.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ClasspathEntry::ClassDir(path)
        } else {
            ClasspathEntry::Jar(path)
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }
}

/// Ordered file-system paths making up one side of a classpath snapshot.
///
/// Order is the class loading search order; comparison logic only cares
/// about membership.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    paths: Vec<PathBuf>,
}

impl ResourceSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// First path whose final component equals `file_name`.
    #[must_use]
    pub fn find_by_file_name(&self, file_name: &str) -> Option<&Path> {
        self.paths
            .iter()
            .find(|path| path.file_name() == Some(OsStr::new(file_name)))
            .map(PathBuf::as_path)
    }

    pub fn entries(&self) -> impl Iterator<Item = ClasspathEntry> + '_ {
        self.paths.iter().map(|p| ClasspathEntry::from_path(p.clone()))
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
