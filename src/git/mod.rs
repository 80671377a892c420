//! Version-control history abstraction
//!
//! The release pipeline needs exactly two things from version control: the
//! textual diff of the manifest introduced by the most recent commit, and
//! the ability to record a rewritten manifest as a new commit. Both are
//! expressed by the [History] trait so the pipeline can run against a real
//! repository or a test double.
//!
//! - [repository::Git2Repository]: implementation backed by the `git2` crate
//! - [mock::MockHistory]: scripted implementation for tests
//!
//! ```rust
//! # use wrapper_release::git::History;
//! # use std::path::Path;
//! # fn example<H: History>(history: &H) -> wrapper_release::Result<()> {
//! let diff = history.diff_last_commit(Path::new("package.json"))?;
//! println!("{}", diff);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockHistory;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::Path;

/// Read and append access to the repository history
pub trait History {
    /// Unified diff of `path` between `HEAD~1` and `HEAD`
    ///
    /// Content lines carry their `+`, `-` or space origin prefix, file and
    /// hunk headers are included verbatim.
    ///
    /// # Returns
    /// * `Ok(String)` - The diff text, empty if the file did not change
    /// * `Err(ReleaseError::DiffUnavailable)` - If either commit or the path cannot be resolved
    fn diff_last_commit(&self, path: &Path) -> Result<String>;

    /// Stage `path` and commit it on top of `HEAD` with `message`
    ///
    /// # Returns
    /// * `Ok(String)` - The id of the new commit
    /// * `Err` - If staging or committing fails
    fn commit_file(&self, path: &Path, message: &str) -> Result<String>;
}
