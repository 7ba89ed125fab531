use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::macros::ok_or_continue;

/// Prefix of the branch header in `git status --porcelain --branch`.
pub const HEADER_PREFIX: &'static str = "##";

static DIVERGENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<direction>ahead|behind) (?<count>\d+)$").expect("divergence regex is valid")
});

/// Raised for porcelain lines too short to hold a status code.
#[derive(Debug, Clone)]
pub struct ParseStatusLineError(String);

impl fmt::Display for ParseStatusLineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "Can't read a status code from line: '{}'", self.0);
    }
}

impl std::error::Error for ParseStatusLineError {}

/// What HEAD points at, according to the status header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// A named local branch
    Branch(String),
    /// No branch checked out, needs a tag or hash to be named
    Detached,
}

impl Default for Head {
    fn default() -> Self {
        return Head::Branch(String::new());
    }
}

/// The parsed `##` header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchLine {
    /// The local side
    pub head: Head,
    /// The remote branch name, or its divergence annotation when there is one
    pub remote: Option<String>,
}

/// The two character XY code in front of every porcelain entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode {
    /// Index side
    pub x: char,
    /// Worktree side
    pub y: char,
}

impl StatusCode {
    /// Reads the code from the start of a porcelain line.
    /// ```
    /// # use gitstatus::status::StatusCode;
    /// let code = StatusCode::from_line("R  old -> new").unwrap();
    /// assert_eq!((code.x, code.y), ('R', ' '));
    /// assert!(StatusCode::from_line("M").is_err());
    /// ```
    pub fn from_line(line: &str) -> Result<Self, ParseStatusLineError> {
        let mut chars = line.chars();
        return match (chars.next(), chars.next()) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(ParseStatusLineError(line.to_owned())),
        };
    }
}

/// Per-category counters accumulated over the porcelain entries.
///
/// The categories are not exclusive, one entry can bump several counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Entries with anything staged in the index column
    pub added: usize,
    /// Entries modified in the worktree
    pub modified: usize,
    /// Entries deleted in the worktree
    pub deleted: usize,
    /// Always zero, renames are counted as untracked
    pub renamed: usize,
    /// Entries with a conflict in the index column
    pub unmerged: usize,
    /// Untracked and renamed entries
    pub untracked: usize,
    /// Non-header lines that were read
    pub entries: usize,
    /// Non-header lines that landed in at least one category
    pub classified: usize,
}

impl StatusCounts {
    /// Adds one entry to the counters.
    pub fn record(&mut self, code: StatusCode) {
        let StatusCode { x, y } = code;
        let before = *self;
        self.entries += 1;

        if x == '?' && y == '?' {
            self.untracked += 1;
        }
        if y == 'M' {
            self.modified += 1;
        }
        if x == 'U' {
            self.unmerged += 1;
        }
        if y == 'D' {
            self.deleted += 1;
        }
        if x == 'R' || y == 'R' {
            self.untracked += 1;
        }
        if x != ' ' {
            self.added += 1;
        }

        if self.category_total() > before.category_total() {
            self.classified += 1;
        }
    }

    fn category_total(&self) -> usize {
        return self.added + self.modified + self.deleted + self.unmerged + self.untracked;
    }
}

/// Everything read out of one `git status --porcelain --branch` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// The header
    pub branch: BranchLine,
    /// The entries
    pub counts: StatusCounts,
}

/// Parses the whole porcelain output.
/// ```
/// # use gitstatus::status::{parse_status, Head};
/// let report = parse_status("## main...origin/main\n M src/lib.rs\n?? notes.txt\n");
/// assert_eq!(report.branch.head, Head::Branch("main".into()));
/// assert_eq!(report.counts.modified, 1);
/// assert_eq!(report.counts.untracked, 1);
/// ```
pub fn parse_status(in_str: &str) -> StatusReport {
    let mut report = StatusReport::default();

    for line in in_str.lines() {
        if line.starts_with(HEADER_PREFIX) {
            report.branch = parse_branch_line(line);
            continue;
        }

        let code = ok_or_continue!(StatusCode::from_line(line));
        log::debug!("{}{} {}", code.x, code.y, line.get(2..).unwrap_or_default());
        report.counts.record(code);
    }

    return report;
}

/// Parses the `##` header line.
/// ```
/// # use gitstatus::status::{parse_branch_line, Head};
/// let line = parse_branch_line("## main...origin/main [ahead 2, behind 1]");
/// assert_eq!(line.head, Head::Branch("main".into()));
/// assert_eq!(line.remote.as_deref(), Some("ahead 2, behind 1"));
/// ```
pub fn parse_branch_line(line: &str) -> BranchLine {
    let rest = line.strip_prefix(HEADER_PREFIX).unwrap_or(line);
    let trimmed = rest.trim();

    if rest.contains("no branch") {
        return BranchLine {
            head: Head::Detached,
            remote: None,
        };
    }

    if rest.contains("Initial commit on") || rest.contains("No commits yet on") {
        let name = rest.split_whitespace().last().unwrap_or_default();
        return BranchLine {
            head: Head::Branch(name.to_owned()),
            remote: None,
        };
    }

    let (branch, upstream) = match trimmed.split_once("...") {
        Some(v) => v,
        None => {
            return BranchLine {
                head: Head::Branch(trimmed.to_owned()),
                remote: None,
            };
        },
    };

    let remote = match upstream.split_once(' ') {
        None => upstream.to_owned(),
        Some((_, annotation)) => {
            let divergence = annotation.trim_matches(|c: char| c == '[' || c == ']');
            log_divergence(divergence);
            divergence.to_owned()
        },
    };

    return BranchLine {
        head: Head::Branch(branch.to_owned()),
        remote: Some(remote),
    };
}

fn log_divergence(divergence: &str) {
    for token in divergence.split(", ") {
        match DIVERGENCE.captures(token) {
            Some(caps) => log::debug!(
                "Local branch is {} remote by {} commit(s)",
                &caps["direction"],
                &caps["count"],
            ),
            None => log::debug!("Divergence: {}", token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn branch(name: &str) -> Head {
        return Head::Branch(name.to_owned());
    }

    #[test]
    fn header_with_divergence() {
        let line = parse_branch_line("## main...origin/main [ahead 2, behind 1]");
        assert_eq!(line, BranchLine {
            head: branch("main"),
            remote: Some("ahead 2, behind 1".into()),
        });
    }

    #[test]
    fn header_without_divergence_keeps_remote_name() {
        let line = parse_branch_line("## feature/x...origin/feature/x");
        assert_eq!(line.head, branch("feature/x"));
        assert_eq!(line.remote.as_deref(), Some("origin/feature/x"));
    }

    #[test]
    fn header_without_upstream() {
        let line = parse_branch_line("## main");
        assert_eq!(line, BranchLine { head: branch("main"), remote: None });
    }

    #[test]
    fn header_on_unborn_branch() {
        assert_eq!(parse_branch_line("## No commits yet on main").head, branch("main"));
        assert_eq!(parse_branch_line("## Initial commit on trunk").head, branch("trunk"));
    }

    #[test]
    fn header_detached() {
        let line = parse_branch_line("## HEAD (no branch)");
        assert_eq!(line, BranchLine { head: Head::Detached, remote: None });
    }

    #[test]
    fn header_with_gone_upstream() {
        let line = parse_branch_line("## topic...origin/topic [gone]");
        assert_eq!(line.remote.as_deref(), Some("gone"));
    }

    #[test]
    fn empty_body_is_all_zero() {
        let report = parse_status("## main\n");
        assert_eq!(report.counts, StatusCounts::default());
        assert_eq!(report.branch.head, branch("main"));
    }

    #[test]
    fn checks_are_independent() {
        let report = parse_status(concat!(
            "## main\n",
            "?? new.txt\n",
            " M changed.rs\n",
            "MM both.rs\n",
            " D gone.rs\n",
            "UU conflict.rs\n",
            "R  old.rs -> new.rs\n",
            "A  staged.rs\n",
        ));
        assert_eq!(report.counts, StatusCounts {
            added: 5,
            modified: 2,
            deleted: 1,
            renamed: 0,
            unmerged: 1,
            untracked: 2,
            entries: 7,
            classified: 7,
        });
    }

    #[test]
    fn classified_never_exceeds_entries() {
        let inputs = [
            "## main\n",
            "## main\n M a\n M b\n",
            "## main\n?? a\nRM b -> c\nDU d\nAA e\n",
            "## main\n   \n!! ignored\n",
        ];
        for input in inputs {
            let counts = parse_status(input).counts;
            assert!(counts.classified <= counts.entries, "{input:?}");
        }
    }

    #[test]
    fn short_lines_are_skipped() {
        let report = parse_status("## main\nM\n\n M ok.rs\n");
        assert_eq!(report.counts.entries, 1);
        assert_eq!(report.counts.modified, 1);
    }

    #[test]
    fn parsing_is_repeatable() {
        let text = "## dev...upstream/dev [behind 4]\n M a.rs\n?? b.rs\n";
        assert_eq!(parse_status(text), parse_status(text));
    }

    #[test]
    fn handles_crlf_and_missing_trailing_newline() {
        let report = parse_status("## main\r\n M a.rs\r\n M b.rs");
        assert_eq!(report.branch.head, branch("main"));
        assert_eq!(report.counts.modified, 2);
    }
}
