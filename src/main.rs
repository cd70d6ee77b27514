use std::process::ExitCode;

use clap::Parser;
use rockpaint::cli::{self, CliArgs};
use rockpaint::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Session log (overwrites the previous session's log)
    logger::init();

    cli::run(args)
}
