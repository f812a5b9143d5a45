//! Version file reading and writing.
//!
//! The version file is both the output of a run and the source of the
//! previously stamped version used for collision checks.

pub mod github;

pub use github::{append_github_output, GithubOutput};

use crate::template;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default path of the generated version file.
pub const DEFAULT_VERSION_FILE: &str = "yt_dlp/version.py";

static VERSION_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^__version__\s*=\s*(?:'([^']*)'|"([^"]*)")"#)
        .expect("VERSION_ASSIGNMENT regex is valid")
});

/// Error type for output file operations.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Error writing or appending to a file.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Error rendering the version file template.
    #[error("Failed to render version file: {0}")]
    Render(#[from] tera::Error),
}

/// Read the version stored in an existing version file.
///
/// A missing file yields `Ok(None)`, as does a file without a `__version__`
/// assignment.
pub fn read_prior_version(path: &Path) -> io::Result<Option<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let version = parse_version_assignment(&content);
    if version.is_none() {
        eprintln!(
            "\x1b[33mWarning:\x1b[0m No __version__ found in {}, skipping collision check",
            path.display()
        );
    }

    Ok(version)
}

/// Extract the `__version__` value from version file contents.
pub fn parse_version_assignment(content: &str) -> Option<String> {
    let caps = VERSION_ASSIGNMENT.captures(content)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Render and write the version file, replacing any existing content.
///
/// Parent directories are not created.
pub fn write_version_file(
    path: &Path,
    version: &str,
    git_head: Option<&str>,
    channel: &str,
) -> Result<(), OutputError> {
    let content = template::render(version, git_head, channel)?;

    fs::write(path, content).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
