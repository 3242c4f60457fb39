use serde::Serialize;

/// Outcome of an analysis: either the change set is safe to compile
/// incrementally, or a full rebuild is required for a stated reason.
///
/// A full-rebuild verdict is final. [`Verdict::record_full_rebuild`] keeps
/// the first cause and ignores later ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum Verdict {
    #[default]
    Incremental,
    FullRebuild { cause: String },
}

impl Verdict {
    pub fn full_rebuild(cause: impl Into<String>) -> Self {
        Verdict::FullRebuild {
            cause: cause.into(),
        }
    }

    #[must_use]
    pub fn is_full_rebuild_needed(&self) -> bool {
        matches!(self, Verdict::FullRebuild { .. })
    }

    /// Set exactly when [`Self::is_full_rebuild_needed`] is true.
    #[must_use]
    pub fn full_rebuild_cause(&self) -> Option<&str> {
        match self {
            Verdict::Incremental => None,
            Verdict::FullRebuild { cause } => Some(cause.as_str()),
        }
    }

    /// Escalates to a full rebuild. Returns `false` (and changes nothing)
    /// when a cause was already recorded.
    pub fn record_full_rebuild(&mut self, cause: impl Into<String>) -> bool {
        if self.is_full_rebuild_needed() {
            return false;
        }
        *self = Verdict::full_rebuild(cause);
        true
    }

    /// Combines a verdict reached earlier (`self`) with a later one.
    pub fn then(self, later: Verdict) -> Verdict {
        match self {
            Verdict::Incremental => later,
            full => full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_has_no_cause() {
        let verdict = Verdict::default();
        assert!(!verdict.is_full_rebuild_needed());
        assert_eq!(verdict.full_rebuild_cause(), None);
    }

    #[test]
    fn first_cause_wins() {
        let mut verdict = Verdict::Incremental;
        assert!(verdict.record_full_rebuild("removed public field X"));
        assert!(!verdict.record_full_rebuild("member removed: com.example.B"));
        assert!(verdict.is_full_rebuild_needed());
        assert_eq!(verdict.full_rebuild_cause(), Some("removed public field X"));
    }

    #[test]
    fn then_keeps_earlier_full_rebuild() {
        let first = Verdict::full_rebuild("first");
        let second = Verdict::full_rebuild("second");
        assert_eq!(first.clone().then(second.clone()), first);
        assert_eq!(Verdict::Incremental.then(second.clone()), second);
        assert_eq!(
            Verdict::Incremental.then(Verdict::Incremental),
            Verdict::Incremental
        );
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(Verdict::full_rebuild("x")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "verdict": "full-rebuild", "cause": "x" })
        );
        let json = serde_json::to_value(Verdict::Incremental).unwrap();
        assert_eq!(json, serde_json::json!({ "verdict": "incremental" }));
    }
}
