use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOptions {
    /// Fold analysis failures into a full-rebuild verdict instead of
    /// returning them.
    #[serde(default = "AnalysisOptions::default_errors_as_full_rebuild")]
    pub errors_as_full_rebuild: bool,

    /// Extensions (without the dot, case-insensitive) of current classpath
    /// entries that are analyzed as archives.
    #[serde(default = "AnalysisOptions::default_archive_extensions")]
    pub archive_extensions: Vec<String>,
}

impl AnalysisOptions {
    fn default_errors_as_full_rebuild() -> bool {
        true
    }

    fn default_archive_extensions() -> Vec<String> {
        vec!["jar".to_owned()]
    }

    pub fn is_archive(&self, path: &std::path::Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.archive_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            errors_as_full_rebuild: Self::default_errors_as_full_rebuild(),
            archive_extensions: Self::default_archive_extensions(),
        }
    }
}
