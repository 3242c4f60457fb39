use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;

use crate::ClassFileBuilder;

/// Collects entries and writes them out as a zip/jar file.
#[derive(Default)]
pub struct JarBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_string(), bytes.into()));
        self
    }

    /// Adds `<internal_name>.class` built from `class`.
    pub fn class(self, class: ClassFileBuilder) -> Self {
        let bytes = class.build();
        let name = format!("{}.class", internal_name_of(&bytes));
        self.entry(&name, bytes)
    }

    pub fn write(&self, path: &Path) {
        let entries: Vec<(&str, &[u8])> = self
            .entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
            .collect();
        write_jar(path, &entries);
    }
}

pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create jar parent dir");
    }
    let file = std::fs::File::create(path).expect("create jar");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).expect("add directory entry");
            continue;
        }
        zip.start_file(*name, options).expect("start jar entry");
        zip.write_all(bytes).expect("write jar entry");
    }
    zip.finish().expect("finish jar");
}

/// Reads `this_class` back out of bytes produced by [`ClassFileBuilder`],
/// whose constant pool always starts with the class name.
fn internal_name_of(bytes: &[u8]) -> String {
    let len = u16::from_be_bytes([bytes[11], bytes[12]]) as usize;
    String::from_utf8(bytes[13..13 + len].to_vec()).expect("utf8 class name")
}
