use std::{fs, path::Path};

/// Counts the entries of a stash reflog, one per non-empty line.
/// ```
/// # use gitstatus::stash::count_stash_entries;
/// let log = "0000 1111 Me <me@example.com> 1700000000 +0000\tWIP on main: abc fix\n";
/// assert_eq!(count_stash_entries(log), 1);
/// assert_eq!(count_stash_entries(""), 0);
/// ```
pub fn count_stash_entries(in_str: &str) -> usize {
    return in_str
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
}

/// Reads `logs/refs/stash` under a git directory. Anything that goes wrong
/// means there is no stash.
pub fn stash_count(git_dir: &Path) -> usize {
    let stash_log = git_dir
        .join("logs")
        .join("refs")
        .join("stash");

    return match fs::read_to_string(&stash_log) {
        Ok(v) => count_stash_entries(&v),
        Err(e) => {
            log::debug!("No stash log at {:?}: {}", stash_log, e);
            0
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs").join("refs");
        fs::create_dir_all(&logs).unwrap();
        fs::write(logs.join("stash"), "a\tWIP on main\nb\tWIP on main\nc\tOn dev: x\n").unwrap();

        assert_eq!(stash_count(dir.path()), 3);
    }

    #[test]
    fn missing_log_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(stash_count(dir.path()), 0);
        assert_eq!(stash_count(&dir.path().join("does-not-exist")), 0);
    }

    #[test]
    fn blank_lines_are_not_entries() {
        assert_eq!(count_stash_entries("one\n\n  \ntwo\n"), 2);
    }
}
