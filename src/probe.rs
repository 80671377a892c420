//! Wrapped compiler version probe
//!
//! The wrapped compiler identifies its releases with a single incrementing
//! number (for example `v20150729`). The probe runs the compiler in its
//! version-report mode, extracts that number and promotes it to a semantic
//! version `<number>.0.0` so the wrapper's major version can track it.

#[cfg(test)]
use mockall::automock;

use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info};

static VERSION_REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)Version:\sv(.*)$").expect("version report pattern is valid")
});

/// Source of the wrapped compiler's version
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CompilerProbe: Send + Sync {
    /// Report the compiler version as `<major>.0.0`
    ///
    /// # Returns
    /// * `Ok(SemanticVersion)` - The promoted compiler version
    /// * `Err(ReleaseError::ProbeFailed)` - If the compiler could not be run or exited non-zero
    /// * `Err(ReleaseError::ParseFailed)` - If the output has no usable version line
    async fn probe_compiler_version(&self) -> Result<SemanticVersion>;
}

/// Returns the token following `Version: v` on the first matching line
pub fn find_version_token(output: &str) -> Option<&str> {
    VERSION_REPORT
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().trim())
}

/// Parse version-report output into a promoted semantic version
pub fn parse_version_report(output: &str) -> Result<SemanticVersion> {
    let token = find_version_token(output)
        .ok_or_else(|| ReleaseError::parse("no 'Version: v<number>' line in compiler output"))?;

    token
        .parse::<u64>()
        .map(SemanticVersion::from_major)
        .map_err(|e| ReleaseError::parse(format!("version token '{}': {}", token, e)))
}

/// Probe that runs the compiler as a subprocess
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
}

impl CommandProbe {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandProbe {
            program: program.into(),
            args,
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait::async_trait]
impl CompilerProbe for CommandProbe {
    async fn probe_compiler_version(&self) -> Result<SemanticVersion> {
        debug!(command = %self.command_line(), "probing compiler version");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                ReleaseError::probe(format!("cannot run '{}': {}", self.command_line(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(ReleaseError::probe(format!(
                "'{}' exited with code {}\nStderr: {}",
                self.command_line(),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        // Java tools often report on stderr
        let report = if find_version_token(&stdout).is_some() {
            stdout
        } else {
            stderr
        };
        let version = parse_version_report(&report)?;

        info!(%version, "compiler version probed");
        Ok(version)
    }
}
