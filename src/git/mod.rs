//! Git operations.
//!
//! This module resolves the commit being stamped.

use std::io;
use std::process::Command;

/// Error type for git lookups.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The git binary could not be started.
    #[error("Failed to run git: {0}")]
    Spawn(#[from] io::Error),
    /// git ran but reported a failure.
    #[error("git rev-parse failed: {0}")]
    Failed(String),
    /// git succeeded but printed nothing usable.
    #[error("git rev-parse returned no commit")]
    Empty,
}

/// Resolve the commit hash of `HEAD` in the current directory.
pub fn resolve_head() -> Result<String, GitError> {
    let output = Command::new("git").args(["rev-parse", "HEAD"]).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::Failed(stderr));
    }

    let head = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if head.is_empty() {
        return Err(GitError::Empty);
    }

    Ok(head)
}

/// Get the current commit hash, if there is one.
///
/// Every failure (git missing, not a repository, no commits yet) is
/// deliberately discarded: a stamp without a head is still a valid stamp.
pub fn head() -> Option<String> {
    resolve_head().ok()
}
