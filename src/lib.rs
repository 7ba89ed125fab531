#![warn(missing_docs)]

//! gitstatus renders a condensed git status for shell prompts.
//! It runs git a handful of times, parses the porcelain output and fills the
//! counts into a template.
//! ```
//! # use gitstatus::{Config, Repo, format::render};
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let repo = Repo::from_config(&config)?; // Points at the current directory
//!
//! if let Ok(summary) = repo.summary() { // Fails outside a repository
//!     println!("{}", render(&summary, &config.format));
//! }
//! # return Ok(());
//! # }
//! ```

/// The command module runs git (or any program) with a deadline. This includes
/// the [`command::Runner`] and its [`command::CommandError`].
pub mod command;

/// The config module holds the [`config::Config`] passed through a run.
pub mod config;

/// The diff module sums `git diff --numstat` output.
pub mod diff;

/// The format module fills summary fields into a prompt template.
pub mod format;

/// The macro module is for the macros included in this library. This includes
/// the [`macros::ok_or_continue`] macro.
pub mod macros;

/// The stash module counts stash entries.
pub mod stash;

/// The status module parses `git status --porcelain --branch`.
pub mod status;

/// The summary module holds the [`summary::RepositoryStatusSummary`] record.
pub mod summary;

mod repo;

pub use crate::config::Config;
pub use crate::repo::Repo;

use anyhow::Result;

const GIT_FOLDERNAME: &'static str = ".git";

/// Queries the repository named by the config and renders the output line.
pub fn run(config: &Config) -> Result<String> {
    let repo = Repo::from_config(config)?;
    let summary = repo.summary()?;

    if config.json {
        return Ok(serde_json::to_string(&summary)?);
    }
    return Ok(format::render(&summary, &config.format));
}
