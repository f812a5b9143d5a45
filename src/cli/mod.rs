//! CLI argument handling and the stamping pipeline.
//!
//! This module contains the clap CLI definition and the code that ties
//! version derivation, git lookup and file output together.

use crate::output::{self, GithubOutput, DEFAULT_VERSION_FILE};
use crate::{git, version};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Stamp a date-based release version into a generated version file.
///
/// Without arguments the version is `YYYY.MM.DD.<epoch-seconds>` for the
/// current UTC time. A bare number is appended as a revision; anything
/// containing a dot is used as the version verbatim.
#[derive(Parser, Debug)]
#[command(name = "verstamp")]
#[command(author, version = crate::VERSION, about, long_about = None)]
pub struct Cli {
    /// A version or revision to use instead of generating one.
    #[arg(id = "version_arg", value_name = "VERSION")]
    pub version: Option<String>,

    /// Select update channel.
    #[arg(short = 'c', long, value_enum, default_value_t = Channel::Stable)]
    pub channel: Channel,

    /// The output file to write to.
    #[arg(short = 'o', long, default_value = DEFAULT_VERSION_FILE)]
    pub output: PathBuf,

    /// File receiving GitHub Actions step outputs.
    ///
    /// An empty value is ignored.
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub github_output: Option<OsString>,
}

/// Release track recorded in the version file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Channel {
    /// Regular releases.
    Stable,
    /// Nightly builds.
    Nightly,
}

impl Channel {
    /// Lowercase name as written to the version file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Cli {
    /// Compute the version, write the version file and publish CI outputs.
    pub fn execute(&self) -> anyhow::Result<()> {
        let git_head = git::head();

        let stamp = version::resolve(self.version.as_deref(), Utc::now(), || {
            output::read_prior_version(&self.output)
        })
        .context("Failed to compute version")?;
        let normalized_version = version::normalize(&stamp.version)?;

        output::write_version_file(
            &self.output,
            &stamp.version,
            git_head.as_deref(),
            self.channel.as_str(),
        )?;

        if let Some(path) = self
            .github_output
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            output::append_github_output(
                Path::new(path),
                &GithubOutput {
                    version: &stamp.version,
                    normalized_version: &normalized_version,
                    build_time: &stamp.build_time,
                },
            )?;
        }

        println!(
            "version={} ({}), head={}",
            stamp.version,
            self.channel,
            git_head.as_deref().unwrap_or("None")
        );

        Ok(())
    }
}
