use crate::{LoadedClass, Verdict};

pub type ComparatorError = Box<dyn std::error::Error + Send + Sync>;

/// Previous and current definition of one changed compiled unit, loaded
/// from two isolated contexts.
#[derive(Clone, Copy, Debug)]
pub struct ClassPair<'a> {
    pub qualified_name: &'a str,
    pub previous: &'a LoadedClass,
    pub current: &'a LoadedClass,
}

/// Judges whether a change to a single compiled unit is safe for
/// incremental compilation.
///
/// A returned `Verdict::FullRebuild` cause is reported to the user verbatim.
pub trait MemberComparator {
    fn compare(&self, pair: &ClassPair<'_>) -> Result<Verdict, ComparatorError>;
}

/// Treats every changed class as unsafe.
///
/// Used when no structural comparator is plugged in.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConservativeComparator;

impl MemberComparator for ConservativeComparator {
    fn compare(&self, pair: &ClassPair<'_>) -> Result<Verdict, ComparatorError> {
        Ok(Verdict::full_rebuild(format!(
            "class changed: {}",
            pair.qualified_name
        )))
    }
}
