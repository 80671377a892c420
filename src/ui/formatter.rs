//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text; `display_*` functions print it.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{ReleaseCheck, ReleaseOutcome};
use crate::version::VersionBump;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Describe why the next version was chosen.
pub fn describe_bump(bump: &VersionBump) -> String {
    match bump {
        VersionBump::AlreadyBumped => "version already changed in the last commit".to_string(),
        VersionBump::CompilerMajor(major) => format!("new compiler release v{}", major),
        VersionBump::Minor => "routine change, minor bump".to_string(),
    }
}

/// Summarize a release-if-changed run.
///
/// Shows the version transition and whether it was persisted:
/// - written: "Released: old -> new"
/// - dry run or not newer: "Would release" / "No release"
pub fn format_release_outcome(outcome: &ReleaseOutcome, dry_run: bool) -> String {
    let transition = format!(
        "{} -> {}",
        style(&outcome.previous).red(),
        style(&outcome.next).green()
    );
    let reason = describe_bump(&outcome.bump);

    if outcome.written {
        format!("Released {} ({})", transition, reason)
    } else if dry_run && outcome.is_newer() {
        format!("Would release {} ({})", transition, reason)
    } else {
        format!(
            "No release: version stays at {} ({})",
            outcome.previous, reason
        )
    }
}

/// Summarize an is-release-needed check.
pub fn format_release_check(check: &ReleaseCheck) -> String {
    if check.needed {
        format!(
            "Release needed: {} {} is newer than published {}",
            check.package,
            style(&check.local).green(),
            check.latest_published
        )
    } else {
        format!(
            "No release needed: {} {} is not newer than published {}",
            check.package, check.local, check.latest_published
        )
    }
}

/// Display the outcome of a release-if-changed run, with its warnings.
pub fn display_release_outcome(outcome: &ReleaseOutcome, dry_run: bool) {
    for warning in &outcome.warnings {
        display_boundary_warning(warning);
    }
    println!(
        "{}  compiler: v{}",
        style("→").yellow(),
        outcome.compiler.major()
    );
    if outcome.written {
        display_success(&format_release_outcome(outcome, dry_run));
    } else {
        display_status(&format_release_outcome(outcome, dry_run));
    }
}

/// Display the result of an is-release-needed check.
pub fn display_release_check(check: &ReleaseCheck) {
    if check.needed {
        display_success(&format_release_check(check));
    } else {
        display_status(&format_release_check(check));
    }
}
