use anyhow::{anyhow, Context, Result};

use super::GIT_FOLDERNAME;

use std::{path::PathBuf, time::Duration};

use crate::{
    command::Runner,
    config::Config,
    diff::{count_numstat, DiffStat},
    stash::stash_count,
    status::{parse_status, Head, StatusReport},
    summary::RepositoryStatusSummary,
};

/// Length of the short hash shown on a detached HEAD.
pub const GIT_HASH_LEN: usize = 12;

/// Struct that represents a repository, queried through the git binary.
#[derive(Debug, Clone)]
pub struct Repo {
    /// The directory git is run in
    pub dir: PathBuf,
    runner: Runner,
}

impl Repo {
    /// Tries to construct a repo from a path.
    pub fn from_pathbuf(path: &PathBuf, timeout: Option<Duration>) -> Result<Self> {
        if path.is_dir() {
            return Ok(
                Repo {
                    dir: path.to_owned(),
                    runner: Runner::new("git", path, timeout),
                });
        } else {
            return Err(anyhow!("Couldn't read repo in path: '{:?}'", path));
        }
    }

    /// Constructs a repo object from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        return Self::from_pathbuf(&config.dir, config.timeout);
    }

    /// Runs a query whose failure only means "unknown". Timeouts still
    /// propagate.
    fn optional(&self, args: &[&str]) -> Result<Option<String>> {
        return match self.runner.run(args) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_timeout() => Err(e.into()),
            Err(e) => {
                log::debug!("{}", e);
                Ok(None)
            },
        };
    }

    /// Reads `git status --porcelain --branch`.
    pub fn status(&self) -> Result<StatusReport> {
        let out = self.runner
            .run(&["status", "--porcelain", "--branch"])
            .with_context(|| format!("Couldn't read status of '{:?}'", self.dir))?;
        return Ok(parse_status(&out));
    }

    /// Returns the exact tag at HEAD or else its short hash. Empty when
    /// neither can be found.
    pub fn tag_or_hash(&self) -> Result<String> {
        if let Some(tag) = self.optional(&["describe", "--tags", "--exact-match"])? {
            let tag = tag.trim();
            if !tag.is_empty() {
                return Ok(tag.to_owned());
            }
        }

        let short = format!("--short={}", GIT_HASH_LEN);
        if let Some(hash) = self.optional(&["rev-parse", &short, "HEAD"])? {
            return Ok(hash.trim().to_owned());
        }

        log::error!("Couldn't find a tag or hash for HEAD in '{:?}'", self.dir);
        return Ok(String::new());
    }

    /// Sums `git diff --numstat`.
    pub fn diff_stat(&self) -> Result<DiffStat> {
        let out = self.runner
            .run(&["diff", "--numstat"])
            .with_context(|| format!("Couldn't diff '{:?}'", self.dir))?;
        return Ok(count_numstat(&out));
    }

    /// Finds the metadata directory, asking git first and then looking for a
    /// plain `.git` folder.
    pub fn git_dir(&self) -> Result<Option<PathBuf>> {
        if let Some(out) = self.optional(&["rev-parse", "--git-dir"])? {
            let out = out.trim();
            if !out.is_empty() {
                return Ok(Some(self.dir.join(out)));
            }
        }

        let git_path = self.dir.join(GIT_FOLDERNAME);
        if git_path.is_dir() {
            return Ok(Some(git_path));
        }
        return Ok(None);
    }

    /// Number of stash entries, zero when there is no stash.
    pub fn stash_count(&self) -> Result<usize> {
        return match self.git_dir()? {
            Some(git_dir) => Ok(stash_count(&git_dir)),
            None => Ok(0),
        };
    }

    /// Runs every query and puts the summary together.
    pub fn summary(&self) -> Result<RepositoryStatusSummary> {
        let report = self.status()?;
        let branch = match &report.branch.head {
            Head::Branch(v) => v.clone(),
            Head::Detached => self.tag_or_hash()?,
        };
        let diff = self.diff_stat()?;
        let stashed = self.stash_count()?;

        let summary = RepositoryStatusSummary::assemble(report, branch, diff, stashed);
        summary.log();
        return Ok(summary);
    }
}
