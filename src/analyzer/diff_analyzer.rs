use crate::boundary::BoundaryWarning;
use crate::error::Result;
use crate::git::History;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// A removed or added manifest line that sets the version field.
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[+-]\s*"version": "(.*)",$"#).expect("version line pattern is valid")
});

/// What the last commit's manifest diff says about the version field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSignal {
    /// No version line was touched
    Unchanged,
    /// Exactly one removed and one added version line
    Bumped,
    /// Any other match count; read as "not bumped"
    Ambiguous(usize),
}

impl DiffSignal {
    /// Classify a diff by the number of matching version lines
    pub fn from_match_count(matches: usize) -> Self {
        match matches {
            0 => DiffSignal::Unchanged,
            2 => DiffSignal::Bumped,
            n => DiffSignal::Ambiguous(n),
        }
    }

    pub fn is_bumped(&self) -> bool {
        matches!(self, DiffSignal::Bumped)
    }

    pub fn warning(&self) -> Option<BoundaryWarning> {
        match self {
            DiffSignal::Ambiguous(matches) => {
                Some(BoundaryWarning::AmbiguousVersionDiff { matches: *matches })
            }
            _ => None,
        }
    }
}

/// Counts lines of `diff` that add or remove the manifest version field
pub fn count_version_lines(diff: &str) -> usize {
    diff.lines()
        .filter(|line| VERSION_LINE.is_match(line))
        .count()
}

/// Classify a manifest diff
pub fn classify_diff(diff: &str) -> DiffSignal {
    DiffSignal::from_match_count(count_version_lines(diff))
}

/// True when `diff` shows the version field being replaced
pub fn was_version_bumped(diff: &str) -> bool {
    classify_diff(diff).is_bumped()
}

/// Detects whether the most recent commit already bumped the manifest version
pub struct DiffAnalyzer<'a, H: History + ?Sized> {
    history: &'a H,
}

impl<'a, H: History + ?Sized> DiffAnalyzer<'a, H> {
    pub fn new(history: &'a H) -> Self {
        DiffAnalyzer { history }
    }

    /// Retrieve the last commit's diff of `manifest` and classify it
    ///
    /// # Returns
    /// * `Ok(DiffSignal)` - Classification of the diff (read-only)
    /// * `Err(ReleaseError::DiffUnavailable)` - If the diff cannot be retrieved
    pub fn analyze(&self, manifest: &Path) -> Result<DiffSignal> {
        let diff = self.history.diff_last_commit(manifest)?;
        let signal = classify_diff(&diff);

        if let Some(warning) = signal.warning() {
            warn!("{}", warning);
        }
        debug!(?signal, "classified manifest diff");
        Ok(signal)
    }

    /// Whether the last commit changed the version field
    pub fn was_version_bumped_in_last_commit(&self, manifest: &Path) -> Result<bool> {
        Ok(self.analyze(manifest)?.is_bumped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::git::MockHistory;
    use rstest::rstest;

    const BUMP_DIFF: &str = r#"diff --git a/package.json b/package.json
index 3f2a1b4..9c8d7e6 100644
--- a/package.json
+++ b/package.json
@@ -1,6 +1,6 @@
 {
   "name": "google-closure-compiler",
-  "version": "20150729.0.0",
+  "version": "20150810.0.0",
   "description": "Check, compile, optimize and compress Javascript",
   "main": "index.js"
 }
"#;

    #[test]
    fn test_bump_diff_is_detected() {
        assert_eq!(count_version_lines(BUMP_DIFF), 2);
        assert!(was_version_bumped(BUMP_DIFF));
    }

    #[rstest]
    #[case("", 0, DiffSignal::Unchanged)]
    #[case(" \"version\": \"1.0.0\",", 0, DiffSignal::Unchanged)]
    #[case("+  \"version\": \"1.1.0\",", 1, DiffSignal::Ambiguous(1))]
    #[case("-  \"version\": \"1.0.0\",\n+  \"version\": \"1.1.0\",", 2, DiffSignal::Bumped)]
    #[case("-\"version\": \"1.0.0\",\n+\"version\": \"1.1.0\",", 2, DiffSignal::Bumped)]
    #[case(
        "-  \"version\": \"1.0.0\",\n+  \"version\": \"1.1.0\",\n+  \"version\": \"1.2.0\",",
        3,
        DiffSignal::Ambiguous(3)
    )]
    fn test_classify_diff(
        #[case] diff: &str,
        #[case] expected_count: usize,
        #[case] expected_signal: DiffSignal,
    ) {
        assert_eq!(count_version_lines(diff), expected_count);
        assert_eq!(classify_diff(diff), expected_signal);
    }

    #[rstest]
    // last field of the object has no trailing comma
    #[case("-  \"version\": \"1.0.0\"\n+  \"version\": \"1.1.0\"")]
    // spacing around the colon must match exactly
    #[case("-  \"version\":\"1.0.0\",\n+  \"version\":\"1.1.0\",")]
    // other fields ending in "version"
    #[case("-  \"engineVersion\": \"1\",\n+  \"engineVersion\": \"2\",")]
    // trailing whitespace after the comma
    #[case("-  \"version\": \"1.0.0\", \n+  \"version\": \"1.1.0\", ")]
    fn test_lines_outside_pattern_do_not_count(#[case] diff: &str) {
        assert_eq!(count_version_lines(diff), 0);
        assert!(!was_version_bumped(diff));
    }

    #[test]
    fn test_only_ambiguous_counts_warn() {
        assert!(DiffSignal::Unchanged.warning().is_none());
        assert!(DiffSignal::Bumped.warning().is_none());
        assert_eq!(
            DiffSignal::Ambiguous(1).warning(),
            Some(BoundaryWarning::AmbiguousVersionDiff { matches: 1 })
        );
    }

    #[test]
    fn test_analyzer_reads_history() {
        let history = MockHistory::with_diff(BUMP_DIFF);
        let analyzer = DiffAnalyzer::new(&history);
        assert!(analyzer
            .was_version_bumped_in_last_commit(Path::new("package.json"))
            .unwrap());
    }

    #[test]
    fn test_analyzer_propagates_diff_failure() {
        let history = MockHistory::without_diff();
        let analyzer = DiffAnalyzer::new(&history);
        let err = analyzer
            .was_version_bumped_in_last_commit(Path::new("package.json"))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::DiffUnavailable(_)));
    }
}
