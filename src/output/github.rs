//! GitHub Actions step outputs.
//!
//! Lines are appended to the file named by `GITHUB_OUTPUT`, so repeated runs
//! in one job accumulate; the last line for a key wins on the Actions side.

use super::OutputError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Values published as step outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubOutput<'a> {
    /// Raw version string.
    pub version: &'a str,
    /// Version with every component in minimal integer form.
    pub normalized_version: &'a str,
    /// Numeric build time.
    pub build_time: &'a str,
}

impl GithubOutput<'_> {
    /// The `key=value` lines to append, in order.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("ytdlp_version={}", self.version),
            format!("latest_version={}", self.version),
            format!("latest_version_normalized={}", self.normalized_version),
            format!("latest_version_numeric={}", self.build_time),
        ]
    }
}

/// Append the step outputs to `path`, creating it if needed.
pub fn append_github_output(path: &Path, output: &GithubOutput<'_>) -> Result<(), OutputError> {
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;

    for line in output.lines() {
        writeln!(file, "{line}").map_err(write_err)?;
    }

    Ok(())
}
