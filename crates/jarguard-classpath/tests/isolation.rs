use std::sync::Arc;

use jarguard_classpath::{ClassLoadingContext, ClasspathError, ResourceSet};
use jarguard_test_utils::{write_jar, ClassFileBuilder, JarBuilder};

#[test]
fn same_name_resolves_to_independent_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let old_jar = dir.path().join("old.jar");
    let new_jar = dir.path().join("new.jar");
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/example/Api").field(0x0001, "count", "I"))
        .write(&old_jar);
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/example/Api").field(0x0001, "total", "J"))
        .write(&new_jar);

    let mut previous = ClassLoadingContext::new("previous", &ResourceSet::new([&old_jar]));
    let mut current = ClassLoadingContext::new("current", &ResourceSet::new([&new_jar]));
    assert_eq!(previous.label(), "previous");
    assert_eq!(current.label(), "current");

    let before = previous.load("com.example.Api").unwrap();
    let after = current.load("com.example.Api").unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.origin, old_jar);
    assert_eq!(after.origin, new_jar);
    assert!(before.class.field("count").is_some());
    assert!(before.class.field("total").is_none());
    assert!(after.class.field("total").is_some());
}

#[test]
fn loads_are_cached_per_context() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("lib.jar");
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/example/A"))
        .write(&jar);
    let resources = ResourceSet::new([&jar]);

    let mut first = ClassLoadingContext::new("first", &resources);
    let mut second = ClassLoadingContext::new("second", &resources);

    let a1 = first.load("com.example.A").unwrap();
    let a2 = first.load("com.example.A").unwrap();
    assert!(Arc::ptr_eq(&a1, &a2));
    assert_eq!(first.loaded_count(), 1);

    assert!(!second.is_loaded("com.example.A"));
    let b = second.load("com.example.A").unwrap();
    assert!(!Arc::ptr_eq(&a1, &b));
}

#[test]
fn search_order_prefers_first_entry() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes");
    std::fs::create_dir_all(classes.join("com/example")).unwrap();
    std::fs::write(
        classes.join("com/example/Dupe.class"),
        ClassFileBuilder::new("com/example/Dupe")
            .method(0x0001, "fromDir", "()V")
            .build(),
    )
    .unwrap();
    let jar = dir.path().join("dupe.jar");
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/example/Dupe").method(0x0001, "fromJar", "()V"))
        .write(&jar);

    let mut ctx = ClassLoadingContext::new("dir-first", &ResourceSet::new([&classes, &jar]));
    let loaded = ctx.load("com.example.Dupe").unwrap();
    assert_eq!(loaded.origin, classes);
    assert!(loaded.class.method("fromDir", "()V").is_some());

    let mut ctx = ClassLoadingContext::new("jar-first", &ResourceSet::new([&jar, &classes]));
    let loaded = ctx.load("com.example.Dupe").unwrap();
    assert_eq!(loaded.origin, jar);
    assert!(loaded.class.method("fromJar", "()V").is_some());
}

#[test]
fn missing_entries_are_skipped_and_unknown_classes_fail() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("lib.jar");
    JarBuilder::new()
        .class(ClassFileBuilder::new("com/example/A"))
        .write(&jar);

    let mut ctx = ClassLoadingContext::new(
        "previous",
        &ResourceSet::new([dir.path().join("gone.jar"), jar.clone()]),
    );
    assert!(ctx.load("com.example.A").is_ok());

    let err = ctx.load("com.example.Missing").unwrap_err();
    assert!(matches!(err, ClasspathError::ClassNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "class com.example.Missing not found on the previous classpath"
    );
}

#[test]
fn misplaced_class_is_a_name_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("lib.jar");
    let bytes = ClassFileBuilder::new("com/example/Other").build();
    write_jar(&jar, &[("com/example/A.class", bytes.as_slice())]);

    let mut ctx = ClassLoadingContext::new("current", &ResourceSet::new([&jar]));
    let err = ctx.load("com.example.A").unwrap_err();
    assert!(matches!(err, ClasspathError::NameMismatch { .. }), "{err}");
}

#[test]
fn corrupt_class_bytes_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("lib.jar");
    write_jar(&jar, &[("com/example/A.class", b"\xCA\xFE\xBA\xBE\x00".as_slice())]);

    let mut ctx = ClassLoadingContext::new("current", &ResourceSet::new([&jar]));
    let err = ctx.load("com.example.A").unwrap_err();
    assert!(matches!(err, ClasspathError::ClassFile { .. }), "{err}");
}
