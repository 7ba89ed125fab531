use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace regex is valid")
});

/// Line totals of `git diff --numstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    /// Sum of the first column
    pub insertions: usize,
    /// Sum of the second column
    pub deletions: usize,
}

/// Sums the numstat columns. Binary files report `-` in both columns and are
/// left out of the totals.
/// ```
/// # use gitstatus::diff::{count_numstat, DiffStat};
/// let stat = count_numstat("3\t1\tfile.go\n-\t-\tlogo.png\n");
/// assert_eq!(stat, DiffStat { insertions: 3, deletions: 1 });
/// ```
pub fn count_numstat(in_str: &str) -> DiffStat {
    let mut stat = DiffStat::default();

    for line in in_str.lines() {
        let mut columns = WHITESPACE.split(line);

        if let Some(Ok(v)) = columns.next().map(str::parse::<usize>) {
            stat.insertions += v;
        }
        if let Some(Ok(v)) = columns.next().map(str::parse::<usize>) {
            stat.deletions += v;
        }
    }

    return stat;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skips_non_numeric_marker() {
        let stat = count_numstat("3\t1\tfile.go\n0\t0\tBIN\n");
        assert_eq!(stat, DiffStat { insertions: 3, deletions: 1 });

        let stat = count_numstat("3\t1\tfile.go\n-\t-\tBIN\n");
        assert_eq!(stat, DiffStat { insertions: 3, deletions: 1 });
    }

    #[test]
    fn sums_every_file() {
        let stat = count_numstat("10\t2\ta.rs\n5\t0\tb.rs\n0\t7\tc.rs\n");
        assert_eq!(stat, DiffStat { insertions: 15, deletions: 9 });
    }

    #[test]
    fn empty_diff() {
        assert_eq!(count_numstat(""), DiffStat::default());
        assert_eq!(count_numstat("\n"), DiffStat::default());
    }

    #[test]
    fn columns_are_independent() {
        // A half numeric line still contributes its numeric side.
        let stat = count_numstat("4\tx\tweird\nx\t6\tweirder\n");
        assert_eq!(stat, DiffStat { insertions: 4, deletions: 6 });
    }
}
