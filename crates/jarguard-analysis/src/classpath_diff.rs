use std::path::PathBuf;

use serde::Serialize;

use crate::{
    AnalysisError, AnalysisOptions, AnalysisUnit, ArchiveDiffUnit, MemberComparator,
    ResourceSet, Verdict,
};

/// Per-archive result of a [`ClasspathDiff`] run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum ArchiveResult {
    Analyzed { verdict: Verdict },
    /// Analysis failed and the failure was folded into the overall verdict.
    Failed { error: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveOutcome {
    pub archive: PathBuf,
    #[serde(flatten)]
    pub result: ArchiveResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClasspathReport {
    pub verdict: Verdict,
    /// Archives in the order they were analyzed. Analysis stops at the first
    /// full rebuild, so later archives may be missing.
    pub archives: Vec<ArchiveOutcome>,
}

/// Runs one [`ArchiveDiffUnit`] per archive entry of the current classpath.
pub struct ClasspathDiff<'c, C: ?Sized> {
    previous: ResourceSet,
    current: ResourceSet,
    comparator: &'c C,
    options: AnalysisOptions,
}

impl<'c, C> ClasspathDiff<'c, C>
where
    C: MemberComparator + ?Sized,
{
    pub fn new(previous: ResourceSet, current: ResourceSet, comparator: &'c C) -> Self {
        Self {
            previous,
            current,
            comparator,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self) -> Result<ClasspathReport, AnalysisError> {
        let mut report = ClasspathReport::default();

        let archives = self
            .current
            .iter()
            .filter(|path| self.options.is_archive(path));
        for archive in archives {
            let outcome = self.analyze_archive(archive);
            let result = match outcome {
                Ok(verdict) => {
                    report.verdict = std::mem::take(&mut report.verdict).then(verdict.clone());
                    ArchiveResult::Analyzed { verdict }
                }
                Err(err) if self.options.errors_as_full_rebuild => {
                    tracing::warn!(
                        target: "jarguard.analysis",
                        archive = %archive.display(),
                        error = %err,
                        "analysis failed; assuming a full rebuild"
                    );
                    report.verdict.record_full_rebuild(format!(
                        "analysis of {} failed: {err}",
                        archive.display()
                    ));
                    ArchiveResult::Failed {
                        error: err.to_string(),
                    }
                }
                Err(err) => return Err(err),
            };

            report.archives.push(ArchiveOutcome {
                archive: archive.clone(),
                result,
            });
            if report.verdict.is_full_rebuild_needed() {
                break;
            }
        }

        Ok(report)
    }

    fn analyze_archive(&self, archive: &std::path::Path) -> Result<Verdict, AnalysisError> {
        let mut unit = ArchiveDiffUnit::new(
            self.previous.clone(),
            self.current.clone(),
            archive,
            self.comparator,
        )?;
        unit.analyze()
    }
}
