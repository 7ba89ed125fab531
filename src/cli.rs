use std::path::PathBuf;

use clap::{
    ArgAction,
    Parser,
};
use log::LevelFilter;

use gitstatus::{
    config::{Config, DEFAULT_TIMEOUT},
    format::DEFAULT_FORMAT,
};

/// Prints a condensed git status for shell prompts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// More logging on stderr, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// No logging at all
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// The path to the repo
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Deadline for each git call in milliseconds, 0 to disable
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout: u64,

    /// Output template: %b branch, %r remote, %m dirty marker, %u untracked,
    /// %a added, %M modified, %d deleted, %U unmerged, %R renamed, %s stashed,
    /// %x insertions, %y deletions, %n vcs name, %% percent
    #[arg(short, long, default_value = DEFAULT_FORMAT, env = "GITSTATUS_FORMAT")]
    pub format: String,

    /// Print the summary as JSON instead
    #[arg(short, long)]
    pub json: bool,
}

impl Args {
    /// Log level picked by the verbosity flags.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        return match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        return Config {
            dir: args.dir,
            timeout: Config::timeout_from_millis(args.timeout),
            format: args.format,
            json: args.json,
        };
    }
}
