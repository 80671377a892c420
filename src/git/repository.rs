use crate::error::{ReleaseError, Result};
use crate::git::History;
use git2::{DiffFormat, DiffOptions, ErrorCode, Repository as Git2Repo};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)
            .map_err(|e| ReleaseError::git(format!("Not in a git repository: {}", e)))?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Resolve `path` to a path relative to the working directory.
    fn relative_path(&self, path: &Path) -> std::result::Result<PathBuf, String> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| "repository has no working directory".to_string())?;
        let workdir =
            fs::canonicalize(workdir).map_err(|e| format!("{}: {}", workdir.display(), e))?;
        let absolute = fs::canonicalize(path).map_err(|e| format!("{}: {}", path.display(), e))?;

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                format!(
                    "{} is outside the repository at {}",
                    path.display(),
                    workdir.display()
                )
            })
    }
}

impl History for Git2Repository {
    fn diff_last_commit(&self, path: &Path) -> Result<String> {
        let relative = self.relative_path(path).map_err(ReleaseError::diff)?;

        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| ReleaseError::diff(format!("Cannot resolve HEAD: {}", e)))?;
        let parent = head
            .parent(0)
            .map_err(|e| ReleaseError::diff(format!("HEAD has no parent commit: {}", e)))?;

        let old_tree = parent
            .tree()
            .map_err(|e| ReleaseError::diff(format!("Cannot read tree of HEAD~1: {}", e)))?;
        let new_tree = head
            .tree()
            .map_err(|e| ReleaseError::diff(format!("Cannot read tree of HEAD: {}", e)))?;

        let mut options = DiffOptions::new();
        options.pathspec(relative.to_string_lossy().into_owned());

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut options))
            .map_err(|e| ReleaseError::diff(format!("Cannot diff HEAD~1..HEAD: {}", e)))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(|e| ReleaseError::diff(format!("Cannot render diff: {}", e)))?;

        debug!(path = %relative.display(), bytes = text.len(), "rendered manifest diff");
        Ok(text)
    }

    fn commit_file(&self, path: &Path, message: &str) -> Result<String> {
        let relative = self.relative_path(path).map_err(ReleaseError::git)?;
        let git_err = |e: git2::Error| ReleaseError::git(e.message().to_string());

        let mut index = self.repo.index().map_err(git_err)?;
        index.add_path(&relative).map_err(git_err)?;
        index.write().map_err(git_err)?;

        let tree_oid = index.write_tree().map_err(git_err)?;
        let tree = self.repo.find_tree(tree_oid).map_err(git_err)?;
        let signature = self.repo.signature().map_err(git_err)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(git_err)?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(git_err(e)),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .map_err(git_err)?;

        debug!(commit = %oid, path = %relative.display(), "recorded commit");
        Ok(oid.to_string())
    }
}
