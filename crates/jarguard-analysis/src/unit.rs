use crate::{AnalysisError, Verdict};

/// The previous and current side of whatever an analysis compares.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourcePair<T> {
    pub previous: T,
    pub current: T,
}

impl<T> ResourcePair<T> {
    pub fn new(previous: T, current: T) -> Self {
        Self { previous, current }
    }
}

/// Common shape of every diff unit: two resource collections and one
/// comparison that may conclude a full rebuild is unavoidable.
pub trait AnalysisUnit {
    type Resources;

    fn resources(&self) -> &ResourcePair<Self::Resources>;

    /// Runs the comparison. Units run once; calling this again returns the
    /// verdict reached the first time.
    fn analyze(&mut self) -> Result<Verdict, AnalysisError>;

    /// Verdict of the last successful [`Self::analyze`], if any.
    fn verdict(&self) -> Option<&Verdict>;

    fn is_full_rebuild_needed(&self) -> bool {
        self.verdict().is_some_and(Verdict::is_full_rebuild_needed)
    }

    fn full_rebuild_cause(&self) -> Option<&str> {
        self.verdict().and_then(Verdict::full_rebuild_cause)
    }
}
