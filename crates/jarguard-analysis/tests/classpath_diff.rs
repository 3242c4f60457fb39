use std::cell::RefCell;
use std::path::PathBuf;

use jarguard_analysis::{
    baseline_file_name, AnalysisError, AnalysisOptions, ArchiveResult, ClassPair, ClasspathDiff,
    ComparatorError, ConservativeComparator, MemberComparator, ResourceSet, Verdict,
};
use jarguard_test_utils::{BuildDirs, ClassFileBuilder, JarBuilder};

/// Counts invocations and treats every change as safe.
#[derive(Default)]
struct PermissiveComparator {
    calls: RefCell<Vec<String>>,
}

impl MemberComparator for PermissiveComparator {
    fn compare(&self, pair: &ClassPair<'_>) -> Result<Verdict, ComparatorError> {
        self.calls.borrow_mut().push(pair.qualified_name.to_string());
        Ok(Verdict::Incremental)
    }
}

/// Writes `name` into the current classpath and a snapshot with `previous`
/// content under its baseline name. Returns (current, snapshot).
fn archive_pair(
    dirs: &BuildDirs,
    name: &str,
    previous: JarBuilder,
    current: JarBuilder,
) -> (PathBuf, PathBuf) {
    let current_path = dirs.current(name);
    let snapshot = dirs.previous(&baseline_file_name(&current_path).unwrap());
    previous.write(&snapshot);
    current.write(&current_path);
    (current_path, snapshot)
}

fn unchanged(dirs: &BuildDirs, name: &str, class: &str) -> (PathBuf, PathBuf) {
    archive_pair(
        dirs,
        name,
        JarBuilder::new().class(ClassFileBuilder::new(class)),
        JarBuilder::new().class(ClassFileBuilder::new(class)),
    )
}

fn changed(dirs: &BuildDirs, name: &str, class: &str) -> (PathBuf, PathBuf) {
    archive_pair(
        dirs,
        name,
        JarBuilder::new().class(ClassFileBuilder::new(class).field(0x0001, "old", "I")),
        JarBuilder::new().class(ClassFileBuilder::new(class).field(0x0001, "new", "I")),
    )
}

#[test]
fn unchanged_classpath_is_incremental() {
    let dirs = BuildDirs::new();
    let (a, a_prev) = unchanged(&dirs, "a.jar", "com/a/A");
    let (b, b_prev) = unchanged(&dirs, "b.jar", "com/b/B");

    let report = ClasspathDiff::new(
        ResourceSet::new([a_prev, b_prev]),
        ResourceSet::new([&a, &b]),
        &ConservativeComparator,
    )
    .run()
    .unwrap();

    assert_eq!(report.verdict, Verdict::Incremental);
    let analyzed: Vec<_> = report.archives.iter().map(|o| o.archive.clone()).collect();
    assert_eq!(analyzed, vec![a, b]);
}

#[test]
fn stops_at_the_first_archive_needing_a_full_rebuild() {
    let dirs = BuildDirs::new();
    let (a, a_prev) = changed(&dirs, "a.jar", "com/a/A");
    let (b, b_prev) = changed(&dirs, "b.jar", "com/b/B");

    let report = ClasspathDiff::new(
        ResourceSet::new([a_prev, b_prev]),
        ResourceSet::new([&a, &b]),
        &ConservativeComparator,
    )
    .run()
    .unwrap();

    assert_eq!(report.verdict.full_rebuild_cause(), Some("class changed: com.a.A"));
    assert_eq!(report.archives.len(), 1);
    assert_eq!(report.archives[0].archive, a);
}

#[test]
fn non_archive_entries_are_not_analyzed() {
    let dirs = BuildDirs::new();
    let classes = dirs.current("classes");
    std::fs::create_dir_all(&classes).unwrap();
    let (a, a_prev) = changed(&dirs, "a.jar", "com/a/A");

    let comparator = PermissiveComparator::default();
    let report = ClasspathDiff::new(
        ResourceSet::new([a_prev]),
        ResourceSet::new([&classes, &a]),
        &comparator,
    )
    .run()
    .unwrap();

    assert_eq!(report.verdict, Verdict::Incremental);
    assert_eq!(report.archives.len(), 1);
    assert_eq!(comparator.calls.borrow().as_slice(), ["com.a.A"]);
}

#[test]
fn archive_extensions_are_configurable() {
    let dirs = BuildDirs::new();
    let (a, a_prev) = changed(&dirs, "a.zip", "com/a/A");

    let ignored = ClasspathDiff::new(
        ResourceSet::new([&a_prev]),
        ResourceSet::new([&a]),
        &ConservativeComparator,
    )
    .run()
    .unwrap();
    assert!(ignored.archives.is_empty());

    let options = AnalysisOptions {
        archive_extensions: vec!["jar".into(), "ZIP".into()],
        ..AnalysisOptions::default()
    };
    let analyzed = ClasspathDiff::new(
        ResourceSet::new([&a_prev]),
        ResourceSet::new([&a]),
        &ConservativeComparator,
    )
    .with_options(options)
    .run()
    .unwrap();
    assert!(analyzed.verdict.is_full_rebuild_needed());
}

#[test]
fn analysis_errors_become_full_rebuilds_by_default() {
    let dirs = BuildDirs::new();
    let (a, a_prev) = unchanged(&dirs, "a.jar", "com/a/A");
    std::fs::write(&a, b"definitely not a zip").unwrap();

    let report = ClasspathDiff::new(
        ResourceSet::new([a_prev]),
        ResourceSet::new([&a]),
        &ConservativeComparator,
    )
    .run()
    .unwrap();

    let cause = report.verdict.full_rebuild_cause().unwrap();
    assert!(cause.starts_with("analysis of "), "{cause}");
    assert!(cause.contains("a.jar"), "{cause}");
    assert!(matches!(
        report.archives[0].result,
        ArchiveResult::Failed { .. }
    ));
}

#[test]
fn analysis_errors_can_be_returned() {
    let dirs = BuildDirs::new();
    let (a, a_prev) = unchanged(&dirs, "a.jar", "com/a/A");
    std::fs::write(&a, b"definitely not a zip").unwrap();

    let options = AnalysisOptions {
        errors_as_full_rebuild: false,
        ..AnalysisOptions::default()
    };
    let err = ClasspathDiff::new(
        ResourceSet::new([a_prev]),
        ResourceSet::new([&a]),
        &ConservativeComparator,
    )
    .with_options(options)
    .run()
    .unwrap_err();
    assert!(matches!(err, AnalysisError::Archive(_)), "{err}");
}

#[test]
fn archive_without_snapshot_is_reported() {
    let dirs = BuildDirs::new();
    let fresh = dirs.current("fresh.jar");
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/f/F"))
        .write(&fresh);

    let report = ClasspathDiff::new(
        ResourceSet::default(),
        ResourceSet::new([&fresh]),
        &ConservativeComparator,
    )
    .run()
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["verdict"]["verdict"], "full-rebuild");
    assert_eq!(json["archives"][0]["outcome"], "analyzed");
    assert!(json["archives"][0]["verdict"]["cause"]
        .as_str()
        .unwrap()
        .starts_with("no previous compiled archive found for"));
}
