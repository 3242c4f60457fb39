//! Naming convention for archive snapshots of the previous build.
//!
//! The build copies every classpath archive into its snapshot directory as
//! `<abs(File.hashCode())>-<base name>`, where `File.hashCode()` is the JVM's
//! hash of the archive path. Reproducing the hash lets us find "the same
//! logical archive" even though the snapshot lives somewhere else.

use std::path::Path;

/// `java.io.UnixFileSystem`/`WinNTFileSystem` mix this into path hashes.
const FILE_HASH_SALT: i32 = 1234321;

/// File name the previous build gave the snapshot of `archive`, or `None`
/// when the path has no UTF-8 file name.
pub fn baseline_file_name(archive: &Path) -> Option<String> {
    let base_name = archive.file_name()?.to_str()?;
    // `Math.abs` semantics: `i32::MIN` stays negative.
    let hash = java_file_hash(archive).wrapping_abs();
    Some(format!("{hash}-{base_name}"))
}

/// The JVM's `File.hashCode()` for `path`.
pub fn java_file_hash(path: &Path) -> i32 {
    let text = path.to_string_lossy();
    #[cfg(unix)]
    let text = normalize_unix(&text);
    #[cfg(windows)]
    let text = text.to_lowercase();
    java_string_hash(&text) ^ FILE_HASH_SALT
}

/// The form `java.io.File` keeps on Unix: runs of `/` collapse to one and a
/// trailing `/` is dropped unless the path is the root.
#[cfg_attr(not(unix), allow(dead_code))]
fn normalize_unix(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(ch);
    }
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// `String.hashCode()`: polynomial hash over UTF-16 code units.
fn java_string_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}
