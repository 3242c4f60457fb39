//! Decides whether the changes between two classpath snapshots can be
//! compiled incrementally or force a full rebuild.
//!
//! The entry point for a single archive is [`ArchiveDiffUnit`]: it pairs the
//! current archive with its snapshot from the previous build, diffs the
//! members by checksum and hands every changed class to a
//! [`MemberComparator`]. [`ClasspathDiff`] runs one unit per archive of a
//! classpath.
//!
//! Outcomes are [`Verdict`] values. An `Err` from `analyze` means the engine
//! could not decide at all; callers should treat it at least as
//! conservatively as a full rebuild.

#![forbid(unsafe_code)]

mod archive_unit;
mod baseline;
mod classpath_diff;
mod comparator;
mod options;
mod unit;
mod verdict;

use std::path::PathBuf;

use thiserror::Error;

use jarguard_archive::ArchiveError;
use jarguard_classpath::ClasspathError;

pub use archive_unit::ArchiveDiffUnit;
pub use baseline::{baseline_file_name, java_file_hash};
pub use classpath_diff::{ArchiveOutcome, ArchiveResult, ClasspathDiff, ClasspathReport};
pub use comparator::{ClassPair, ComparatorError, ConservativeComparator, MemberComparator};
pub use options::AnalysisOptions;
pub use unit::{AnalysisUnit, ResourcePair};
pub use verdict::Verdict;

pub use jarguard_classfile::ClassFile;
pub use jarguard_classpath::{LoadedClass, ResourceSet};

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The current archive path has no usable file name.
    #[error("invalid archive path {}", .path.display())]
    InvalidArchivePath { path: PathBuf },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Classpath(#[from] ClasspathError),
    #[error("comparing {class} failed: {source}")]
    Comparator {
        class: String,
        #[source]
        source: ComparatorError,
    },
}
