//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::{error::Error, process::ExitCode};

use nearbite_cli::CliError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match nearbite_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "fatal errors are reported on stderr")]
fn report(err: &CliError) {
    let mut shown = err.to_string();
    eprintln!("nearbite: {shown}");
    let mut cause = err.source();
    while let Some(source) = cause {
        let message = source.to_string();
        // Most variants already embed their source in the message.
        if !shown.contains(&message) {
            eprintln!("  caused by: {message}");
        }
        shown = message;
        cause = source.source();
    }
}
