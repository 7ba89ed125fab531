mod cli;

use clap::Parser;
use simple_logger::SimpleLogger;

use std::process::exit;

use cli::Args;
use gitstatus::{command::timed_out, Config};

/// Printed instead of the prompt when git is too slow.
const TIMEOUT_MESSAGE: &'static str = "timeout";

fn main() {
    let args = match Args::try_parse() {
        Ok(v) => v,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            exit(1);
        },
    };

    // Logs go to stderr, stdout carries only the prompt line
    if let Err(e) = SimpleLogger::new().with_level(args.log_level()).init() {
        eprintln!("Couldn't set up logging: {}", e);
    }

    let config = Config::from(args);
    log::debug!("Config: {:?}", config);

    match gitstatus::run(&config) {
        Ok(line) => println!("{}", line),
        Err(e) if timed_out(&e) => {
            log::error!("{:#}", e);
            println!("{}", TIMEOUT_MESSAGE);
            exit(1);
        },
        Err(e) => {
            log::error!("{:#}", e);
            exit(1);
        },
    }
}
