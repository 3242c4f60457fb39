use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jarguard_archive::{class_entry_name, ArchiveReader, JarReader};
use jarguard_classfile::ClassFile;

use crate::{ClasspathEntry, ClasspathError, ResourceSet};

/// A class resolved from a [`ClassLoadingContext`].
#[derive(Debug)]
pub struct LoadedClass {
    pub binary_name: String,
    /// Classpath entry (jar or class directory) the definition came from.
    pub origin: PathBuf,
    pub class: ClassFile,
}

enum Source {
    Dir(PathBuf),
    Jar {
        path: PathBuf,
        reader: Option<JarReader>,
    },
}

impl Source {
    fn path(&self) -> &Path {
        match self {
            Source::Dir(path) | Source::Jar { path, .. } => path,
        }
    }

    fn read(&mut self, entry_name: &str) -> Result<Option<Vec<u8>>, ClasspathError> {
        match self {
            Source::Dir(dir) => {
                let candidate = dir.join(entry_name);
                match std::fs::read(&candidate) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(ClasspathError::Io {
                        path: candidate,
                        source,
                    }),
                }
            }
            Source::Jar { path, reader } => {
                let reader = match reader {
                    Some(reader) => reader,
                    slot @ None => slot.insert(JarReader::open(path.as_path())?),
                };
                Ok(reader.read(entry_name)?)
            }
        }
    }
}

/// An isolated class namespace over one [`ResourceSet`].
///
/// Classes are looked up in search-path order; the first entry defining a
/// name wins. Parsed classes and opened jars are cached per context and
/// never shared, so the same qualified name can resolve to two different
/// definitions in two contexts. Dropping the context releases every handle.
pub struct ClassLoadingContext {
    label: String,
    sources: Vec<Source>,
    cache: HashMap<String, Arc<LoadedClass>>,
}

impl ClassLoadingContext {
    /// `label` names the context in errors and logs (`previous`, `current`).
    pub fn new(label: impl Into<String>, resources: &ResourceSet) -> Self {
        let label = label.into();
        let mut sources = Vec::with_capacity(resources.len());
        for entry in resources.entries() {
            // Nonexistent entries are skipped, as a JVM URL class loader does.
            match entry {
                ClasspathEntry::ClassDir(dir) => sources.push(Source::Dir(dir)),
                ClasspathEntry::Jar(path) if path.is_file() => {
                    sources.push(Source::Jar { path, reader: None })
                }
                ClasspathEntry::Jar(path) => {
                    tracing::debug!(
                        target: "jarguard.classpath",
                        context = %label,
                        path = %path.display(),
                        "skipping missing classpath entry"
                    );
                }
            }
        }

        Self {
            label,
            sources,
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of classes materialized so far.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_loaded(&self, binary_name: &str) -> bool {
        self.cache.contains_key(binary_name)
    }

    /// Resolves and parses `binary_name` (`com.example.Foo$Inner`).
    pub fn load(&mut self, binary_name: &str) -> Result<Arc<LoadedClass>, ClasspathError> {
        if let Some(loaded) = self.cache.get(binary_name) {
            return Ok(Arc::clone(loaded));
        }

        let internal_name = binary_name.replace('.', "/");
        let entry_name = class_entry_name(&internal_name);

        for source in &mut self.sources {
            let Some(bytes) = source.read(&entry_name)? else {
                continue;
            };

            let origin = source.path().to_path_buf();
            let class = ClassFile::parse(&bytes).map_err(|source| ClasspathError::ClassFile {
                name: binary_name.to_string(),
                path: origin.clone(),
                source,
            })?;
            if class.this_class != internal_name {
                return Err(ClasspathError::NameMismatch {
                    path: origin,
                    expected: internal_name,
                    found: class.this_class,
                });
            }

            tracing::trace!(
                target: "jarguard.classpath",
                context = %self.label,
                class = binary_name,
                origin = %origin.display(),
                "loaded class"
            );
            let loaded = Arc::new(LoadedClass {
                binary_name: binary_name.to_string(),
                origin,
                class,
            });
            self.cache
                .insert(binary_name.to_string(), Arc::clone(&loaded));
            return Ok(loaded);
        }

        Err(ClasspathError::ClassNotFound {
            name: binary_name.to_string(),
            context: self.label.clone(),
        })
    }
}
