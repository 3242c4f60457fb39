//! Conversions between archive entry names and class names.

const CLASS_SUFFIX: &str = ".class";
const VERSIONS_PREFIX: &str = "META-INF/versions/";

pub fn class_entry_name(internal_name: &str) -> String {
    format!("{internal_name}{CLASS_SUFFIX}")
}

/// `com/example/Foo.class` -> `com/example/Foo`; `None` for non-class entries.
pub fn entry_to_internal_name(entry_name: &str) -> Option<&str> {
    entry_name
        .strip_prefix('/')
        .unwrap_or(entry_name)
        .strip_suffix(CLASS_SUFFIX)
        .filter(|name| !name.is_empty() && !name.ends_with('/'))
}

/// `com/example/Foo$Inner.class` -> `com.example.Foo$Inner`.
pub fn qualified_name(entry_name: &str) -> Option<String> {
    entry_to_internal_name(entry_name).map(|internal| internal.replace('/', "."))
}

/// Whether a class loader asking for the entry's class would find this
/// entry. `/Top.class` names the class `Top`, but a lookup of `Top` reads
/// `Top.class`.
pub fn is_loadable_class_entry(entry_name: &str) -> bool {
    entry_to_internal_name(entry_name).is_some_and(|internal| {
        entry_name.len() == internal.len() + CLASS_SUFFIX.len() && entry_name.starts_with(internal)
    })
}

/// Whether the entry is a multi-release override under
/// `META-INF/versions/<n>/`.
pub fn is_versioned_entry(entry_name: &str) -> bool {
    entry_name
        .strip_prefix(VERSIONS_PREFIX)
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(version, _)| version.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names() {
        assert_eq!(
            qualified_name("com/example/Foo.class").as_deref(),
            Some("com.example.Foo")
        );
        assert_eq!(
            qualified_name("com/example/Foo$Inner.class").as_deref(),
            Some("com.example.Foo$Inner")
        );
        assert_eq!(qualified_name("Top.class").as_deref(), Some("Top"));
        assert_eq!(qualified_name("/Top.class").as_deref(), Some("Top"));
        assert_eq!(qualified_name("META-INF/MANIFEST.MF"), None);
        assert_eq!(qualified_name("dir/.class"), None);
        // Only the suffix is stripped, not an inner ".class" segment.
        assert_eq!(
            qualified_name("a/classy.class/B.class").as_deref(),
            Some("a.classy.class.B")
        );
    }

    #[test]
    fn round_trips_internal_names() {
        let entry = class_entry_name("com/example/Foo");
        assert_eq!(entry, "com/example/Foo.class");
        assert_eq!(entry_to_internal_name(&entry), Some("com/example/Foo"));
    }

    #[test]
    fn leading_slash_entries_are_not_loadable() {
        assert!(is_loadable_class_entry("com/example/Foo.class"));
        assert!(is_loadable_class_entry("Top.class"));
        assert!(!is_loadable_class_entry("/Top.class"));
        assert!(!is_loadable_class_entry("/com/example/Foo.class"));
        assert!(!is_loadable_class_entry("META-INF/MANIFEST.MF"));
    }

    #[test]
    fn detects_versioned_entries() {
        assert!(is_versioned_entry("META-INF/versions/9/com/example/Foo.class"));
        assert!(!is_versioned_entry("META-INF/versions/nine/com/example/Foo.class"));
        assert!(!is_versioned_entry("com/example/Foo.class"));
    }
}
