use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};

/// Represents the kind of version change the calculator decided on.
///
/// Evaluated in order: an existing bump in the last commit wins, then a new
/// upstream compiler major release, then the routine minor bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionBump {
    /// The previous commit already changed the version
    AlreadyBumped,
    /// The wrapped compiler reported a newer major version
    CompilerMajor(u64),
    /// Routine change
    Minor,
}

/// Decides which bump applies.
///
/// Only the integer major of `compiler` is compared; the probe always
/// reports zero for minor and patch.
pub fn decide_bump(
    already_bumped: bool,
    current: &SemanticVersion,
    compiler: &SemanticVersion,
) -> VersionBump {
    if already_bumped {
        VersionBump::AlreadyBumped
    } else if compiler.major() > current.major() {
        VersionBump::CompilerMajor(compiler.major())
    } else {
        VersionBump::Minor
    }
}

/// Applies a bump decision to the current version.
///
/// - **AlreadyBumped**: current version unchanged
/// - **CompilerMajor**: major = compiler major, minor = 0, patch = 0
/// - **Minor**: minor += 1, patch = 0
///
/// Pre-release and build metadata are dropped by both bumping rules.
/// Fails when the minor component cannot be incremented.
pub fn bump_version(current: &SemanticVersion, bump: &VersionBump) -> Result<SemanticVersion> {
    match bump {
        VersionBump::AlreadyBumped => Ok(current.clone()),
        VersionBump::CompilerMajor(major) => Ok(SemanticVersion::from_major(*major)),
        VersionBump::Minor => {
            let minor = current.minor().checked_add(1).ok_or_else(|| {
                ReleaseError::version(format!("minor version of {} cannot be incremented", current))
            })?;
            Ok(SemanticVersion::new(current.major(), minor, 0))
        }
    }
}

/// Computes the next package version.
///
/// # Example
/// ```
/// use wrapper_release::domain::SemanticVersion;
/// use wrapper_release::version::compute_next_version;
///
/// let current = SemanticVersion::new(1, 5, 0);
/// let compiler = SemanticVersion::new(20, 0, 0);
/// assert_eq!(
///     compute_next_version(false, &current, &compiler).unwrap(),
///     SemanticVersion::new(20, 0, 0)
/// );
/// ```
pub fn compute_next_version(
    already_bumped: bool,
    current: &SemanticVersion,
    compiler: &SemanticVersion,
) -> Result<SemanticVersion> {
    bump_version(current, &decide_bump(already_bumped, current, compiler))
}
