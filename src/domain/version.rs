use crate::error::{ReleaseError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version ordered by semver precedence.
///
/// Wraps [`semver::Version`]. Ordering and equality compare major, minor,
/// patch and pre-release only; build metadata is carried through
/// serialization but never affects precedence.
#[derive(Debug, Clone)]
pub struct SemanticVersion(semver::Version);

impl SemanticVersion {
    /// Create a release version with no pre-release or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion(semver::Version::new(major, minor, patch))
    }

    /// Parse the canonical `major.minor.patch[-pre][+build]` form
    pub fn parse(text: &str) -> Result<Self> {
        semver::Version::parse(text.trim())
            .map(SemanticVersion)
            .map_err(|e| ReleaseError::version(format!("'{}': {}", text, e)))
    }

    /// Version whose major component is `major` and whose minor and patch are zero
    pub fn from_major(major: u64) -> Self {
        Self::new(major, 0, 0)
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }

    fn precedence_key(&self) -> (u64, u64, u64, &semver::Prerelease) {
        (self.0.major, self.0.minor, self.0.patch, &self.0.pre)
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_key().cmp(&other.precedence_key())
    }
}

impl FromStr for SemanticVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<semver::Version> for SemanticVersion {
    fn from(version: semver::Version) -> Self {
        SemanticVersion(version)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
