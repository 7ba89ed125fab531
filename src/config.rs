use std::{path::PathBuf, time::Duration};

use crate::format::DEFAULT_FORMAT;

/// Default deadline for each git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Everything a run needs, handed down explicitly instead of living in globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory inside the repository
    pub dir: PathBuf,
    /// Deadline per git invocation, `None` to wait as long as it takes
    pub timeout: Option<Duration>,
    /// Output template, see [`crate::format::render`]
    pub format: String,
    /// Print the summary as JSON instead of the template
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            dir: PathBuf::from("."),
            timeout: Some(DEFAULT_TIMEOUT),
            format: DEFAULT_FORMAT.to_owned(),
            json: false,
        };
    }
}

impl Config {
    /// Turns a millisecond count into a timeout, `0` meaning none.
    /// ```
    /// # use std::time::Duration;
    /// # use gitstatus::Config;
    /// assert_eq!(Config::timeout_from_millis(250), Some(Duration::from_millis(250)));
    /// assert_eq!(Config::timeout_from_millis(0), None);
    /// ```
    pub fn timeout_from_millis(millis: u64) -> Option<Duration> {
        return match millis {
            0 => None,
            v => Some(Duration::from_millis(v)),
        };
    }
}
