use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const VERSION_FIELD: &str = "version";
const NAME_FIELD: &str = "name";

/// Immutable snapshot of the package manifest.
///
/// Holds the full JSON document so that rewriting only replaces the
/// `version` field and keeps every other field (and its key order) intact.
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    path: PathBuf,
    document: Map<String, Value>,
    version: SemanticVersion,
}

impl ManifestSnapshot {
    /// Read and parse the manifest at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ReleaseError::manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(path, &text)
    }

    /// Parse manifest text that was read from `path`
    pub fn parse<P: AsRef<Path>>(path: P, text: &str) -> Result<Self> {
        let path = path.as_ref();
        let value: Value = serde_json::from_str(text).map_err(|e| {
            ReleaseError::manifest(format!("{} is not valid JSON: {}", path.display(), e))
        })?;

        let Value::Object(document) = value else {
            return Err(ReleaseError::manifest(format!(
                "{} must contain a JSON object",
                path.display()
            )));
        };

        let raw_version = document
            .get(VERSION_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ReleaseError::manifest(format!(
                    "{} has no string \"{}\" field",
                    path.display(),
                    VERSION_FIELD
                ))
            })?;
        let version = SemanticVersion::parse(raw_version)?;

        Ok(ManifestSnapshot {
            path: path.to_path_buf(),
            document,
            version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted package version
    pub fn version(&self) -> &SemanticVersion {
        &self.version
    }

    /// The package name, if the manifest declares one
    pub fn name(&self) -> Option<&str> {
        self.document.get(NAME_FIELD).and_then(Value::as_str)
    }

    /// A copy of this snapshot with the version field replaced
    pub fn with_version(&self, version: &SemanticVersion) -> Self {
        let mut document = self.document.clone();
        document.insert(
            VERSION_FIELD.to_string(),
            Value::String(version.to_string()),
        );
        ManifestSnapshot {
            path: self.path.clone(),
            document,
            version: version.clone(),
        }
    }

    /// Serialize with 2-space indentation and a trailing newline
    pub fn render(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.document)
            .map_err(|e| ReleaseError::persistence(format!("cannot serialize manifest: {}", e)))?;
        text.push('\n');
        Ok(text)
    }

    /// Write the snapshot over its manifest file.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the manifest, so readers never observe a partial file.
    /// The existing manifest's permissions are carried over to the new file.
    pub fn write_atomic(&self) -> Result<()> {
        let text = self.render()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
            ReleaseError::persistence(format!(
                "cannot create temporary file in {}: {}",
                dir.display(),
                e
            ))
        })?;
        temp.write_all(text.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| ReleaseError::persistence(format!("cannot write manifest: {}", e)))?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| {
                    ReleaseError::persistence(format!("cannot set manifest permissions: {}", e))
                })?;
        }
        temp.persist(&self.path).map_err(|e| {
            ReleaseError::persistence(format!("cannot replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}
