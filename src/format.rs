use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::summary::RepositoryStatusSummary;

/// Template used when none is given.
pub const DEFAULT_FORMAT: &'static str = "[%n:%b]";

/// Name printed for `%n`.
pub const VCS_NAME: &'static str = "git";

/// Printed for `%m` when the worktree is dirty.
pub const DIRTY_MARKER: &'static str = "+";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)%(?<key>.)").expect("placeholder regex is valid")
});

fn expand(summary: &RepositoryStatusSummary, key: &str) -> Option<String> {
    let value = match key {
        "b" => summary.branch.clone(),
        "r" => summary.remote.clone(),
        "m" => match summary.is_dirty() {
            true => DIRTY_MARKER.to_owned(),
            false => String::new(),
        },
        "u" => summary.untracked.to_string(),
        "a" => summary.added.to_string(),
        "M" => summary.modified.to_string(),
        "d" => summary.deleted.to_string(),
        "R" => summary.renamed.to_string(),
        "U" => summary.unmerged.to_string(),
        "s" => summary.stashed.to_string(),
        "x" => summary.insertions.to_string(),
        "y" => summary.deletions.to_string(),
        "n" => VCS_NAME.to_owned(),
        "%" => "%".to_owned(),
        _ => return None,
    };
    return Some(value);
}

/// Fills a template with the summary. Unknown placeholders are left as they
/// are and substituted values are never expanded again.
/// ```
/// # use gitstatus::{format::render, summary::RepositoryStatusSummary};
/// let summary = RepositoryStatusSummary {
///     branch: "main".into(),
///     ..Default::default()
/// };
/// assert_eq!(render(&summary, "[%n:%b]"), "[git:main]");
/// assert_eq!(render(&summary, "%q stays"), "%q stays");
/// ```
pub fn render(summary: &RepositoryStatusSummary, template: &str) -> String {
    return PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            match expand(summary, &caps["key"]) {
                Some(v) => v,
                None => caps[0].to_owned(),
            }
        })
        .into_owned();
}
