//! Command-line interface for the Nearbite place discovery engine.
//!
//! Three subcommands drive the engine: `random` and `keyword` climb the
//! radius ladder around a location and `bounds` lists venues inside a
//! rectangle. Options merge from CLI flags, `NEARBITE_CMDS_*` environment
//! variables and configuration files. Results are printed to stdout as
//! pretty JSON; logs go to stderr.
#![forbid(unsafe_code)]

use std::{future::Future, io::Write};

use clap::{Parser, Subcommand};
use serde::Serialize;

mod bounds;
mod discover;
mod error;
mod providers;

use bounds::{BoundsArgs, run_bounds};
use discover::{KeywordArgs, RandomArgs, run_keyword, run_random};
pub use error::CliError;

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LNG: &str = "lng";
pub(crate) const ARG_FILTER: &str = "filter";
pub(crate) const ARG_TIER: &str = "tier";
pub(crate) const ARG_EXCLUDE: &str = "exclude";
pub(crate) const ARG_MIN_DISTANCE: &str = "min-distance";
pub(crate) const ARG_KEYWORD: &str = "keyword";
pub(crate) const ARG_MIN_LAT: &str = "min-lat";
pub(crate) const ARG_MAX_LAT: &str = "max-lat";
pub(crate) const ARG_MIN_LNG: &str = "min-lng";
pub(crate) const ARG_MAX_LNG: &str = "max-lng";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_SAVE: &str = "save";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_PROVIDERS: &str = "providers";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_GOONG_API_KEY: &str = "goong-api-key";
pub(crate) const ARG_GOONG_URL: &str = "goong-url";
pub(crate) const ARG_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_GEOCODER_URL: &str = "geocoder-url";

pub(crate) const ENV_RANDOM_LAT: &str = "NEARBITE_CMDS_RANDOM_LAT";
pub(crate) const ENV_RANDOM_LNG: &str = "NEARBITE_CMDS_RANDOM_LNG";
pub(crate) const ENV_KEYWORD_LAT: &str = "NEARBITE_CMDS_KEYWORD_LAT";
pub(crate) const ENV_KEYWORD_LNG: &str = "NEARBITE_CMDS_KEYWORD_LNG";
pub(crate) const ENV_KEYWORD_TEXT: &str = "NEARBITE_CMDS_KEYWORD_KEYWORD";
pub(crate) const ENV_BOUNDS_MIN_LAT: &str = "NEARBITE_CMDS_BOUNDS_MIN_LAT";
pub(crate) const ENV_BOUNDS_MAX_LAT: &str = "NEARBITE_CMDS_BOUNDS_MAX_LAT";
pub(crate) const ENV_BOUNDS_MIN_LNG: &str = "NEARBITE_CMDS_BOUNDS_MIN_LNG";
pub(crate) const ENV_BOUNDS_MAX_LNG: &str = "NEARBITE_CMDS_BOUNDS_MAX_LNG";

/// Run the Nearbite CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// provider chain cannot be built, or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Random(args) => run_random(args),
        Command::Keyword(args) => run_keyword(args),
        Command::Bounds(args) => run_bounds(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "nearbite",
    about = "Discover somewhere nearby to eat or drink",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend a random venue, widening the search radius until one turns up.
    Random(RandomArgs),
    /// Find a venue whose name or category matches a keyword.
    Keyword(KeywordArgs),
    /// List venues inside a bounding box.
    Bounds(BoundsArgs),
}

/// Drive `future` to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::StartRuntime)?;
    Ok(runtime.block_on(future))
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
