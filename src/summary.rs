use serde::Serialize;

use crate::{diff::DiffStat, status::StatusReport};

/// Remote descriptor used when the branch tracks nothing.
pub const NO_REMOTE: &'static str = ".";

/// The condensed state of a repository, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStatusSummary {
    /// Local branch, or tag / short hash on a detached HEAD
    pub branch: String,
    /// Remote branch or divergence annotation, `"."` without an upstream
    pub remote: String,
    /// Entries with a staged change
    pub added: usize,
    /// Entries modified in the worktree
    pub modified: usize,
    /// Entries deleted in the worktree
    pub deleted: usize,
    /// Always zero, see [`crate::status::StatusCounts::renamed`]
    pub renamed: usize,
    /// Conflicted entries
    pub unmerged: usize,
    /// Untracked entries
    pub untracked: usize,
    /// Stash entries
    pub stashed: usize,
    /// Inserted lines in the worktree diff
    pub insertions: usize,
    /// Deleted lines in the worktree diff
    pub deletions: usize,
}

impl RepositoryStatusSummary {
    /// Puts the parsed parts together. `branch` is the already resolved name
    /// of HEAD.
    /// ```
    /// # use gitstatus::{summary::RepositoryStatusSummary, status::parse_status, diff::DiffStat};
    /// let report = parse_status("## main\n");
    /// let summary = RepositoryStatusSummary::assemble(report, "main".into(), DiffStat::default(), 0);
    /// assert_eq!(summary.remote, ".");
    /// ```
    pub fn assemble(report: StatusReport, branch: String, diff: DiffStat, stashed: usize) -> Self {
        let counts = report.counts;
        let remote = match report.branch.remote {
            Some(v) if !v.is_empty() => v,
            _ => NO_REMOTE.to_owned(),
        };

        return Self {
            branch,
            remote,
            added: counts.added,
            modified: counts.modified,
            deleted: counts.deleted,
            renamed: counts.renamed,
            unmerged: counts.unmerged,
            untracked: counts.untracked,
            stashed,
            insertions: diff.insertions,
            deletions: diff.deletions,
        };
    }

    /// True when anything is added, modified or deleted.
    pub fn is_dirty(&self) -> bool {
        return self.added > 0 || self.modified > 0 || self.deleted > 0;
    }

    /// Writes every field to the log at debug level.
    pub fn log(&self) {
        log::debug!("Branch:     {}", self.branch);
        log::debug!("Remote:     {}", self.remote);
        log::debug!("Added:      {}", self.added);
        log::debug!("Modified:   {}", self.modified);
        log::debug!("Deleted:    {}", self.deleted);
        log::debug!("Renamed:    {}", self.renamed);
        log::debug!("Unmerged:   {}", self.unmerged);
        log::debug!("Untracked:  {}", self.untracked);
        log::debug!("Stashed:    {}", self.stashed);
        log::debug!("Insertions: {}", self.insertions);
        log::debug!("Deletions:  {}", self.deletions);
    }
}
