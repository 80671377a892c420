//! Domain models for wrapper-release

pub mod manifest;
pub mod version;

pub use manifest::ManifestSnapshot;
pub use version::SemanticVersion;
