use std::fmt;

/// Conditions that degrade a release decision without aborting it.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The last commit's manifest diff matched the version pattern an
    /// unexpected number of times; treated as "not yet bumped"
    AmbiguousVersionDiff { matches: usize },
    /// A registry version key could not be parsed and was skipped
    UnparsablePublishedVersion { raw: String, reason: String },
    /// The computed version is not newer than the manifest version
    NotNewer { current: String, computed: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::AmbiguousVersionDiff { matches } => {
                write!(
                    f,
                    "Last commit touched the version line {} time(s); expected 0 or 2, assuming no bump",
                    matches
                )
            }
            BoundaryWarning::UnparsablePublishedVersion { raw, reason } => {
                write!(f, "Skipping published version '{}': {}", raw, reason)
            }
            BoundaryWarning::NotNewer { current, computed } => {
                write!(
                    f,
                    "Computed version {} is not newer than {}, nothing to write",
                    computed, current
                )
            }
        }
    }
}
