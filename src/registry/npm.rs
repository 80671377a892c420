//! npm registry API implementation

use std::collections::HashMap;
use std::time::Duration;

use crate::boundary::BoundaryWarning;
use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use crate::registry::Registry;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default base URL for npm registry
pub const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    versions: HashMap<String, serde_json::Value>,
}

/// Registry implementation for npm registry API
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a registry client for `base_url` whose requests give up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wrapper-release/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ReleaseError::registry(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_published_versions(&self, package_name: &str) -> Result<Vec<SemanticVersion>> {
        let url = format!(
            "{}/{}",
            self.base_url,
            Self::encode_package_name(package_name)
        );
        debug!(%url, "fetching published versions");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReleaseError::registry(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(ReleaseError::registry(format!(
                "{} returned status {}",
                url, status
            )));
        }

        let package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            ReleaseError::registry(format!("invalid response from {}: {}", url, e))
        })?;

        let mut versions = Vec::with_capacity(package_info.versions.len());
        for raw in package_info.versions.into_keys() {
            match SemanticVersion::parse(&raw) {
                Ok(version) => versions.push(version),
                Err(e) => {
                    let warning = BoundaryWarning::UnparsablePublishedVersion {
                        raw,
                        reason: e.to_string(),
                    };
                    warn!("{}", warning);
                }
            }
        }

        debug!(count = versions.len(), "published versions parsed");
        Ok(versions)
    }
}
