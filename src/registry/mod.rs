//! Published version lookup and the "is a release needed" decision

#[cfg(test)]
use mockall::automock;

pub mod npm;

pub use npm::NpmRegistry;

use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};

/// Trait for fetching the versions a package has published
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches every published version of `package_name`
    ///
    /// # Returns
    /// * `Ok(Vec<SemanticVersion>)` - Published versions, in no particular order
    /// * `Err(ReleaseError::RegistryUnavailable)` - On transport or response errors
    async fn fetch_published_versions(&self, package_name: &str) -> Result<Vec<SemanticVersion>>;
}

/// Highest published version under semver precedence
pub fn latest_published(published: &[SemanticVersion]) -> Option<&SemanticVersion> {
    published.iter().max()
}

/// A release is needed iff `local` is strictly greater than every published version.
///
/// An empty published set cannot answer the question and is an error.
pub fn is_release_needed(
    package_name: &str,
    local: &SemanticVersion,
    published: &[SemanticVersion],
) -> Result<bool> {
    let latest = latest_published(published)
        .ok_or_else(|| ReleaseError::EmptyVersionSet(package_name.to_string()))?;
    Ok(local > latest)
}
