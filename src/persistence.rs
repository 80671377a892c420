use crate::boundary::BoundaryWarning;
use crate::domain::{ManifestSnapshot, SemanticVersion};
use crate::error::{ReleaseError, Result};
use crate::git::History;
use tracing::{info, warn};

/// Commit message used when none is configured
pub const DEFAULT_COMMIT_MESSAGE: &str = "Increment version number to {version}";

/// Render a commit message template, replacing `{version}`
pub fn commit_message(template: &str, version: &SemanticVersion) -> String {
    template.replace("{version}", &version.to_string())
}

/// Writes `new_version` into the manifest and commits it, if it is newer.
///
/// Nothing is written unless `new_version` is strictly greater than the
/// snapshot's version. The manifest is replaced atomically; if the commit
/// then fails the rewritten file is left in place and
/// [`ReleaseError::HistoryFailed`] is returned.
///
/// # Returns
/// * `Ok(true)` - The manifest was rewritten and committed
/// * `Ok(false)` - `new_version` was not newer; nothing was touched
/// * `Err(ReleaseError::PersistenceFailed)` - The manifest could not be written
/// * `Err(ReleaseError::HistoryFailed)` - Written but not committed
pub fn apply_if_newer<H: History + ?Sized>(
    snapshot: &ManifestSnapshot,
    new_version: &SemanticVersion,
    history: &H,
    message_template: &str,
) -> Result<bool> {
    if new_version <= snapshot.version() {
        let warning = BoundaryWarning::NotNewer {
            current: snapshot.version().to_string(),
            computed: new_version.to_string(),
        };
        info!("{}", warning);
        return Ok(false);
    }

    snapshot.with_version(new_version).write_atomic()?;
    info!(path = %snapshot.path().display(), version = %new_version, "manifest updated");

    let message = commit_message(message_template, new_version);
    let commit = history
        .commit_file(snapshot.path(), &message)
        .map_err(|e| {
            warn!("manifest written but commit failed: {}", e);
            ReleaseError::HistoryFailed {
                version: new_version.to_string(),
                reason: e.to_string(),
            }
        })?;

    info!(%commit, "{}", message);
    Ok(true)
}
