//! Release pipelines
//!
//! Both pipelines run their stages strictly in sequence and abort on the
//! first error; nothing downstream of a failed stage runs. The manifest is
//! passed in as an immutable snapshot and never re-read mid-pipeline.

use tracing::info;

use crate::analyzer::DiffAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::domain::{ManifestSnapshot, SemanticVersion};
use crate::error::{ReleaseError, Result};
use crate::git::History;
use crate::persistence::{apply_if_newer, DEFAULT_COMMIT_MESSAGE};
use crate::probe::CompilerProbe;
use crate::registry::{is_release_needed, latest_published, Registry};
use crate::version::{bump_version, decide_bump, VersionBump};

/// Options for the release-if-changed pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    /// Compute the next version but write and commit nothing
    pub dry_run: bool,

    /// Commit message template containing `{version}`
    pub commit_message: String,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        ReleaseOptions {
            dry_run: false,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Result of the release-if-changed pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// Version in the manifest before the pipeline ran
    pub previous: SemanticVersion,

    /// Version reported by the wrapped compiler
    pub compiler: SemanticVersion,

    /// Which rule produced `next`
    pub bump: VersionBump,

    /// The computed next version
    pub next: SemanticVersion,

    /// Whether the manifest was rewritten and committed
    pub written: bool,

    /// Non-fatal conditions met along the way
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseOutcome {
    /// True when `next` is newer than the manifest version
    pub fn is_newer(&self) -> bool {
        self.next > self.previous
    }
}

/// Diff, probe, calculate, persist.
///
/// # Arguments
/// * `snapshot` - Manifest as loaded at the start of the run
/// * `history` - Source of the last commit's diff and sink for the new commit
/// * `probe` - Wrapped compiler version source
/// * `options` - Dry-run flag and commit message template
pub async fn release_if_changed<H, P>(
    snapshot: &ManifestSnapshot,
    history: &H,
    probe: &P,
    options: &ReleaseOptions,
) -> Result<ReleaseOutcome>
where
    H: History + ?Sized,
    P: CompilerProbe + ?Sized,
{
    let signal = DiffAnalyzer::new(history).analyze(snapshot.path())?;
    let compiler = probe.probe_compiler_version().await?;

    let previous = snapshot.version().clone();
    let bump = decide_bump(signal.is_bumped(), &previous, &compiler);
    let next = bump_version(&previous, &bump)?;
    info!(%previous, %compiler, %next, ?bump, "computed next version");

    let mut warnings: Vec<BoundaryWarning> = signal.warning().into_iter().collect();

    let written = if options.dry_run {
        false
    } else {
        apply_if_newer(snapshot, &next, history, &options.commit_message)?
    };

    if bump != VersionBump::AlreadyBumped && next <= previous {
        warnings.push(BoundaryWarning::NotNewer {
            current: previous.to_string(),
            computed: next.to_string(),
        });
    }

    Ok(ReleaseOutcome {
        previous,
        compiler,
        bump,
        next,
        written,
        warnings,
    })
}

/// Result of the is-release-needed check
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseCheck {
    pub package: String,
    pub local: SemanticVersion,
    pub latest_published: SemanticVersion,
    pub needed: bool,
}

/// Compare the manifest version with the newest version on the registry.
///
/// The package name is `package_override` if given, otherwise the
/// manifest's `name` field.
pub async fn check_release_needed<R>(
    snapshot: &ManifestSnapshot,
    registry: &R,
    package_override: Option<&str>,
) -> Result<ReleaseCheck>
where
    R: Registry + ?Sized,
{
    let package = package_override
        .or_else(|| snapshot.name())
        .ok_or_else(|| {
            ReleaseError::config(format!(
                "{} has no \"name\" field and no registry package is configured",
                snapshot.path().display()
            ))
        })?
        .to_string();

    let published = registry.fetch_published_versions(&package).await?;
    let local = snapshot.version().clone();
    let needed = is_release_needed(&package, &local, &published)?;
    let latest = latest_published(&published)
        .cloned()
        .ok_or_else(|| ReleaseError::EmptyVersionSet(package.clone()))?;

    info!(%package, %local, %latest, needed, "release check complete");
    Ok(ReleaseCheck {
        package,
        local,
        latest_published: latest,
        needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockHistory;
    use crate::probe::MockCompilerProbe;
    use crate::registry::MockRegistry;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = "{\n  \"name\": \"google-closure-compiler\",\n  \"version\": \"1.5.0\",\n  \"main\": \"index.js\"\n}\n";

    const BUMP_DIFF: &str = "--- a/package.json\n+++ b/package.json\n@@ -1,4 +1,4 @@\n {\n   \"name\": \"google-closure-compiler\",\n-  \"version\": \"1.4.0\",\n+  \"version\": \"1.5.0\",\n   \"main\": \"index.js\"\n";

    fn manifest_in(dir: &TempDir) -> ManifestSnapshot {
        let path = dir.path().join("package.json");
        fs::write(&path, MANIFEST).unwrap();
        ManifestSnapshot::load(path).unwrap()
    }

    fn probe_returning(major: u64) -> MockCompilerProbe {
        let mut probe = MockCompilerProbe::new();
        probe
            .expect_probe_compiler_version()
            .times(1)
            .returning(move || Ok(SemanticVersion::from_major(major)));
        probe
    }

    #[tokio::test]
    async fn test_new_compiler_major_is_written() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff("");

        let outcome = release_if_changed(
            &snapshot,
            &history,
            &probe_returning(20),
            &ReleaseOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.next, SemanticVersion::new(20, 0, 0));
        assert_eq!(outcome.bump, VersionBump::CompilerMajor(20));
        assert!(outcome.written);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            ManifestSnapshot::load(snapshot.path()).unwrap().version(),
            &SemanticVersion::new(20, 0, 0)
        );
        assert_eq!(
            history.commits()[0].message,
            "Increment version number to 20.0.0"
        );
    }

    #[tokio::test]
    async fn test_routine_change_bumps_minor() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff("");

        let outcome = release_if_changed(
            &snapshot,
            &history,
            &probe_returning(1),
            &ReleaseOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.next, SemanticVersion::new(1, 6, 0));
        assert!(outcome.written);
        assert_eq!(history.commits().len(), 1);
    }

    #[tokio::test]
    async fn test_already_bumped_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff(BUMP_DIFF);

        let outcome = release_if_changed(
            &snapshot,
            &history,
            &probe_returning(20),
            &ReleaseOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.bump, VersionBump::AlreadyBumped);
        assert_eq!(outcome.next, SemanticVersion::new(1, 5, 0));
        assert!(!outcome.written);
        assert!(outcome.warnings.is_empty());
        assert!(history.commits().is_empty());
        assert_eq!(fs::read_to_string(snapshot.path()).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_ambiguous_diff_is_treated_as_not_bumped() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff("+  \"version\": \"1.5.0\",\n");

        let outcome = release_if_changed(
            &snapshot,
            &history,
            &probe_returning(1),
            &ReleaseOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.next, SemanticVersion::new(1, 6, 0));
        assert!(outcome.written);
        assert_eq!(
            outcome.warnings,
            vec![BoundaryWarning::AmbiguousVersionDiff { matches: 1 }]
        );
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff("");
        let options = ReleaseOptions {
            dry_run: true,
            ..ReleaseOptions::default()
        };

        let outcome = release_if_changed(&snapshot, &history, &probe_returning(20), &options)
            .await
            .unwrap();

        assert!(outcome.is_newer());
        assert!(!outcome.written);
        assert!(history.commits().is_empty());
        assert_eq!(fs::read_to_string(snapshot.path()).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_minor_overflow_aborts_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        let text = MANIFEST.replace("1.5.0", "1.18446744073709551615.0");
        fs::write(&path, &text).unwrap();
        let snapshot = ManifestSnapshot::load(&path).unwrap();
        let history = MockHistory::with_diff("");

        let err = release_if_changed(
            &snapshot,
            &history,
            &probe_returning(1),
            &ReleaseOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::Version(_)));
        assert!(history.commits().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[tokio::test]
    async fn test_diff_failure_aborts_before_probe() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::without_diff();
        let mut probe = MockCompilerProbe::new();
        probe.expect_probe_compiler_version().times(0);

        let err = release_if_changed(&snapshot, &history, &probe, &ReleaseOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::DiffUnavailable(_)));
        assert_eq!(fs::read_to_string(snapshot.path()).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_before_write() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let history = MockHistory::with_diff("");
        let mut probe = MockCompilerProbe::new();
        probe
            .expect_probe_compiler_version()
            .times(1)
            .returning(|| Err(ReleaseError::parse("no version line")));

        let err = release_if_changed(&snapshot, &history, &probe, &ReleaseOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::ParseFailed(_)));
        assert!(history.commits().is_empty());
        assert_eq!(fs::read_to_string(snapshot.path()).unwrap(), MANIFEST);
    }

    #[tokio::test]
    async fn test_check_release_needed_uses_manifest_name() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_published_versions()
            .withf(|name| name == "google-closure-compiler")
            .times(1)
            .returning(|_| Ok(vec![SemanticVersion::new(1, 4, 0), SemanticVersion::new(1, 3, 2)]));

        let check = check_release_needed(&snapshot, &registry, None)
            .await
            .unwrap();

        assert!(check.needed);
        assert_eq!(check.package, "google-closure-compiler");
        assert_eq!(check.latest_published, SemanticVersion::new(1, 4, 0));
    }

    #[tokio::test]
    async fn test_check_release_needed_with_override() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_published_versions()
            .withf(|name| name == "@scope/other")
            .times(1)
            .returning(|_| Ok(vec![SemanticVersion::new(1, 5, 0)]));

        let check = check_release_needed(&snapshot, &registry, Some("@scope/other"))
            .await
            .unwrap();

        assert!(!check.needed);
    }

    #[tokio::test]
    async fn test_check_release_needed_empty_set_is_error() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_published_versions()
            .returning(|_| Ok(Vec::new()));

        let err = check_release_needed(&snapshot, &registry, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::EmptyVersionSet(_)));
    }

    #[tokio::test]
    async fn test_check_release_needed_propagates_registry_error() {
        let dir = TempDir::new().unwrap();
        let snapshot = manifest_in(&dir);
        let mut registry = MockRegistry::new();
        registry
            .expect_fetch_published_versions()
            .returning(|_| Err(ReleaseError::registry("timed out")));

        let err = check_release_needed(&snapshot, &registry, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::RegistryUnavailable(_)));
    }

    #[tokio::test]
    async fn test_check_release_needed_requires_package_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, "{\"version\": \"1.0.0\"}\n").unwrap();
        let snapshot = ManifestSnapshot::load(&path).unwrap();
        let mut registry = MockRegistry::new();
        registry.expect_fetch_published_versions().times(0);

        let err = check_release_needed(&snapshot, &registry, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Config(_)));
    }
}
