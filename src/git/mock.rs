use crate::error::{ReleaseError, Result};
use crate::git::History;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Recorded call to [History::commit_file]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub path: PathBuf,
    pub message: String,
}

/// Mock history for testing without a real repository
pub struct MockHistory {
    diff: Option<String>,
    fail_commit: bool,
    commits: RefCell<Vec<RecordedCommit>>,
}

impl MockHistory {
    /// Create a mock whose last commit produced `diff`
    pub fn with_diff(diff: impl Into<String>) -> Self {
        MockHistory {
            diff: Some(diff.into()),
            fail_commit: false,
            commits: RefCell::new(Vec::new()),
        }
    }

    /// Create a mock whose diff retrieval fails
    pub fn without_diff() -> Self {
        MockHistory {
            diff: None,
            fail_commit: false,
            commits: RefCell::new(Vec::new()),
        }
    }

    /// Make every commit attempt fail
    pub fn failing_commits(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Commits recorded so far
    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.borrow().clone()
    }
}

impl Default for MockHistory {
    fn default() -> Self {
        Self::with_diff("")
    }
}

impl History for MockHistory {
    fn diff_last_commit(&self, _path: &Path) -> Result<String> {
        self.diff
            .clone()
            .ok_or_else(|| ReleaseError::diff("mock history has no previous commit"))
    }

    fn commit_file(&self, path: &Path, message: &str) -> Result<String> {
        if self.fail_commit {
            return Err(ReleaseError::git("mock commit rejected"));
        }

        let mut commits = self.commits.borrow_mut();
        commits.push(RecordedCommit {
            path: path.to_path_buf(),
            message: message.to_string(),
        });
        Ok(format!("{:040x}", commits.len()))
    }
}
