//! Random-access readers over compiled-unit archives (JARs).
//!
//! An archive is consumed as a sequence of [`MemberRecord`]s: the member's
//! in-archive path plus the CRC-32 stored in the zip directory. Checksums come
//! from the central directory, so diffing two archives never inflates member
//! contents.

mod names;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;

pub use names::{
    class_entry_name, entry_to_internal_name, is_loadable_class_entry, is_versioned_entry,
    qualified_name,
};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ArchiveError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn zip(path: &Path, source: zip::result::ZipError) -> Self {
        ArchiveError::Zip {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One file entry of an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRecord {
    /// Path inside the archive, `/`-separated (`com/example/Foo.class`).
    pub name: String,
    pub checksum: u32,
}

impl MemberRecord {
    /// Dotted qualified name for compiled-unit members, `None` for resources.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        qualified_name(&self.name)
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        entry_to_internal_name(&self.name).is_some()
    }
}

/// Random access to the members of one opened archive.
///
/// Implementations own their underlying handle; dropping the reader releases
/// it.
pub trait ArchiveReader {
    #[must_use]
    fn path(&self) -> &Path;

    /// Number of raw entries, directories included.
    fn entry_count(&self) -> usize;

    /// The entry at `index`, or `None` when it is a directory.
    fn member_at(&mut self, index: usize) -> Result<Option<MemberRecord>, ArchiveError>;

    /// Looks up a member by its in-archive path.
    fn member(&mut self, name: &str) -> Result<Option<MemberRecord>, ArchiveError>;

    /// Reads a member's contents. Returns `Ok(None)` when it isn't present.
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError>;

    /// Lazily enumerates every file member in directory order.
    fn members(&mut self) -> Members<'_, Self>
    where
        Self: Sized,
    {
        Members {
            reader: self,
            next: 0,
        }
    }
}

/// Iterator returned by [`ArchiveReader::members`].
pub struct Members<'a, R: ArchiveReader> {
    reader: &'a mut R,
    next: usize,
}

impl<R: ArchiveReader> Iterator for Members<'_, R> {
    type Item = Result<MemberRecord, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.reader.entry_count() {
            let index = self.next;
            self.next += 1;
            match self.reader.member_at(index) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

/// Opens archives for reading. The seam lets callers substitute readers
/// (e.g. instrumented ones) without touching the diff logic.
pub trait ArchiveOpener {
    type Reader: ArchiveReader;

    fn open(&self, path: &Path) -> Result<Self::Reader, ArchiveError>;
}

/// Opens zip-format archives from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct JarOpener;

impl ArchiveOpener for JarOpener {
    type Reader = JarReader;

    fn open(&self, path: &Path) -> Result<JarReader, ArchiveError> {
        JarReader::open(path)
    }
}

/// [`ArchiveReader`] over a zip file on disk.
pub struct JarReader {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl JarReader {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let path = path.into();
        let file = File::open(&path).map_err(|err| ArchiveError::io(&path, err))?;
        let zip = ZipArchive::new(file).map_err(|err| ArchiveError::zip(&path, err))?;
        tracing::trace!(
            target: "jarguard.archive",
            path = %path.display(),
            entries = zip.len(),
            "opened archive"
        );
        Ok(Self { path, zip })
    }

    fn record(&mut self, index: usize) -> Result<Option<MemberRecord>, ArchiveError> {
        let entry = self
            .zip
            .by_index_raw(index)
            .map_err(|err| ArchiveError::zip(&self.path, err))?;
        if entry.is_dir() {
            return Ok(None);
        }
        Ok(Some(MemberRecord {
            name: entry.name().to_string(),
            checksum: entry.crc32(),
        }))
    }
}

impl ArchiveReader for JarReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn entry_count(&self) -> usize {
        self.zip.len()
    }

    fn member_at(&mut self, index: usize) -> Result<Option<MemberRecord>, ArchiveError> {
        self.record(index)
    }

    fn member(&mut self, name: &str) -> Result<Option<MemberRecord>, ArchiveError> {
        match self.zip.index_for_name(name) {
            Some(index) => self.record(index),
            None => Ok(None),
        }
    }

    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(ArchiveError::zip(&self.path, err)),
        };
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|err| ArchiveError::io(&self.path, err))?;
        Ok(Some(bytes))
    }
}

impl Drop for JarReader {
    fn drop(&mut self) {
        tracing::trace!(target: "jarguard.archive", path = %self.path.display(), "closed archive");
    }
}
