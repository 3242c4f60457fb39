use std::path::{Path, PathBuf};

use jarguard_archive::{
    is_loadable_class_entry, is_versioned_entry, ArchiveOpener, ArchiveReader, JarOpener,
    MemberRecord,
};
use jarguard_classpath::{ClassLoadingContext, ResourceSet};

use crate::{
    baseline_file_name, AnalysisError, AnalysisUnit, ClassPair, MemberComparator, ResourcePair,
    Verdict,
};

/// Diffs one archive of the current classpath against its snapshot from the
/// previous build.
///
/// The snapshot is located at construction time by file name (see
/// [`baseline_file_name`]). [`AnalysisUnit::analyze`] then walks the previous
/// archive's compiled units, skips those whose checksum is unchanged, and
/// asks the comparator about the rest, stopping at the first one that
/// requires a full rebuild.
pub struct ArchiveDiffUnit<'c, C: ?Sized, O = JarOpener> {
    resources: ResourcePair<ResourceSet>,
    current_archive: PathBuf,
    previous_archive: Option<PathBuf>,
    comparator: &'c C,
    opener: O,
    verdict: Option<Verdict>,
}

impl<'c, C> ArchiveDiffUnit<'c, C, JarOpener>
where
    C: MemberComparator + ?Sized,
{
    pub fn new(
        previous: ResourceSet,
        current: ResourceSet,
        current_archive: impl Into<PathBuf>,
        comparator: &'c C,
    ) -> Result<Self, AnalysisError> {
        let current_archive = current_archive.into();
        let Some(expected_name) = baseline_file_name(&current_archive) else {
            return Err(AnalysisError::InvalidArchivePath {
                path: current_archive,
            });
        };

        let previous_archive = previous
            .find_by_file_name(&expected_name)
            .map(Path::to_path_buf);
        tracing::debug!(
            target: "jarguard.analysis",
            archive = %current_archive.display(),
            expected = %expected_name,
            found = previous_archive.is_some(),
            "resolved previous archive"
        );

        Ok(Self {
            resources: ResourcePair::new(previous, current),
            current_archive,
            previous_archive,
            comparator,
            opener: JarOpener,
            verdict: None,
        })
    }
}

impl<'c, C, O> ArchiveDiffUnit<'c, C, O>
where
    C: MemberComparator + ?Sized,
    O: ArchiveOpener,
{
    /// Replaces how archives are opened.
    pub fn with_opener<O2: ArchiveOpener>(self, opener: O2) -> ArchiveDiffUnit<'c, C, O2> {
        ArchiveDiffUnit {
            resources: self.resources,
            current_archive: self.current_archive,
            previous_archive: self.previous_archive,
            comparator: self.comparator,
            opener,
            verdict: self.verdict,
        }
    }

    #[must_use]
    pub fn current_archive(&self) -> &Path {
        &self.current_archive
    }

    /// The matched snapshot, if the previous classpath contained one.
    #[must_use]
    pub fn previous_archive(&self) -> Option<&Path> {
        self.previous_archive.as_deref()
    }

    fn run(&self) -> Result<Verdict, AnalysisError> {
        let Some(previous_archive) = self.previous_archive.as_deref().filter(|p| p.exists())
        else {
            tracing::info!(
                target: "jarguard.analysis",
                archive = %self.current_archive.display(),
                "no previous archive to compare against"
            );
            return Ok(Verdict::full_rebuild(format!(
                "no previous compiled archive found for {}",
                self.current_archive.display()
            )));
        };

        // Everything acquired below is owned by this frame and dropped on
        // every return path, `?` included.
        let mut contexts = ResourcePair::new(
            ClassLoadingContext::new("previous", &self.resources.previous),
            ClassLoadingContext::new("current", &self.resources.current),
        );
        let mut previous = self.opener.open(previous_archive)?;
        let mut current = self.opener.open(&self.current_archive)?;
        tracing::debug!(
            target: "jarguard.analysis",
            previous = %previous.path().display(),
            current = %current.path().display(),
            "comparing archives"
        );

        let first_unsafe = previous
            .members()
            .map(|member| self.diff_member(member?, &mut current, &mut contexts))
            .find(|result| !matches!(result, Ok(Verdict::Incremental)));

        for context in [&contexts.previous, &contexts.current] {
            tracing::trace!(
                target: "jarguard.analysis",
                context = context.label(),
                loaded = context.loaded_count(),
                "classes loaded"
            );
        }

        match first_unsafe {
            None => Ok(Verdict::Incremental),
            Some(result) => result,
        }
    }

    fn diff_member(
        &self,
        member: MemberRecord,
        current: &mut O::Reader,
        contexts: &mut ResourcePair<ClassLoadingContext>,
    ) -> Result<Verdict, AnalysisError> {
        let Some(qualified_name) = member.qualified_name() else {
            // Resources aren't compiled units.
            return Ok(Verdict::Incremental);
        };

        let Some(counterpart) = current.member(&member.name)? else {
            // Dependents may still reference a deleted unit.
            let cause = if is_versioned_entry(&member.name) {
                format!("multi-release member removed: {}", member.name)
            } else {
                format!("member removed: {qualified_name}")
            };
            return Ok(Verdict::full_rebuild(cause));
        };

        if counterpart.checksum == member.checksum {
            return Ok(Verdict::Incremental);
        }

        tracing::debug!(
            target: "jarguard.analysis",
            archive = %self.current_archive.display(),
            member = %member.name,
            "member changed"
        );

        if is_versioned_entry(&member.name) {
            // Without a target release there's no single definition to load.
            return Ok(Verdict::full_rebuild(format!(
                "multi-release member changed: {}",
                member.name
            )));
        }

        if !is_loadable_class_entry(&member.name) {
            // Loading by class name would read a different entry.
            return Ok(Verdict::full_rebuild(format!(
                "member not loadable by class name: {}",
                member.name
            )));
        }

        let previous_class = contexts.previous.load(&qualified_name)?;
        let current_class = contexts.current.load(&qualified_name)?;
        let pair = ClassPair {
            qualified_name: &qualified_name,
            previous: &previous_class,
            current: &current_class,
        };
        self.comparator
            .compare(&pair)
            .map_err(|source| AnalysisError::Comparator {
                class: qualified_name.clone(),
                source,
            })
    }
}

impl<'c, C, O> AnalysisUnit for ArchiveDiffUnit<'c, C, O>
where
    C: MemberComparator + ?Sized,
    O: ArchiveOpener,
{
    type Resources = ResourceSet;

    fn resources(&self) -> &ResourcePair<ResourceSet> {
        &self.resources
    }

    fn analyze(&mut self) -> Result<Verdict, AnalysisError> {
        if let Some(verdict) = &self.verdict {
            return Ok(verdict.clone());
        }

        let verdict = self.run()?;
        if let Some(cause) = verdict.full_rebuild_cause() {
            tracing::info!(
                target: "jarguard.analysis",
                archive = %self.current_archive.display(),
                cause,
                "full rebuild required"
            );
        }
        self.verdict = Some(verdict.clone());
        Ok(verdict)
    }

    fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }
}
