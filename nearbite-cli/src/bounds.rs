//! `bounds` command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use nearbite_core::{DEFAULT_BOUNDS_LIMIT, Place, ProgressiveSearch};
use nearbite_data::persist_places_to_sqlite;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_GEOCODER_URL, ARG_GOONG_API_KEY, ARG_GOONG_URL, ARG_LIMIT, ARG_MAX_LAT,
    ARG_MAX_LNG, ARG_MIN_LAT, ARG_MIN_LNG, ARG_OVERPASS_URL, ARG_PROVIDERS, ARG_SAVE,
    ARG_TIMEOUT_SECS, CliError, ENV_BOUNDS_MAX_LAT, ENV_BOUNDS_MAX_LNG, ENV_BOUNDS_MIN_LAT,
    ENV_BOUNDS_MIN_LNG, block_on,
    providers::{ChainBuilder, ChainSettings, DefaultChainBuilder, ProviderFields},
    write_json,
};

/// CLI arguments for the `bounds` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "bounds",
    long_about = "List venues inside a latitude/longitude rectangle, for \
                 example the visible area of a map. Results can be saved to \
                 a SQLite place database that later searches read through \
                 the `sqlite` provider.",
    about = "List venues inside a bounding box"
)]
#[ortho_config(prefix = "NEARBITE")]
pub(crate) struct BoundsArgs {
    /// Southern edge in degrees.
    #[arg(long = ARG_MIN_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) min_lat: Option<f64>,
    /// Northern edge in degrees.
    #[arg(long = ARG_MAX_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) max_lat: Option<f64>,
    /// Western edge in degrees.
    #[arg(long = ARG_MIN_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) min_lng: Option<f64>,
    /// Eastern edge in degrees.
    #[arg(long = ARG_MAX_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) max_lng: Option<f64>,
    /// Maximum number of venues to list (default 50).
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Save the listed venues to this SQLite database.
    #[arg(long = ARG_SAVE, value_name = "path")]
    #[serde(default)]
    pub(crate) save: Option<Utf8PathBuf>,
    /// Path to a SQLite place database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Comma-separated provider order (default `sqlite,goong,overpass`).
    #[arg(long = ARG_PROVIDERS, value_name = "list")]
    #[serde(default)]
    pub(crate) providers: Option<String>,
    /// Per-provider call timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Goong API key; Goong is skipped without one.
    #[arg(long = ARG_GOONG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) goong_api_key: Option<String>,
    /// Override the Goong Place API base URL.
    #[arg(long = ARG_GOONG_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) goong_url: Option<String>,
    /// Override the Overpass interpreter URL.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Override the reverse geocoder URL.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
}

impl BoundsArgs {
    pub(crate) fn into_config(self) -> Result<BoundsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BoundsConfig::try_from(merged)
    }
}

/// Resolved `bounds` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct BoundsConfig {
    pub(crate) min_lat: f64,
    pub(crate) max_lat: f64,
    pub(crate) min_lng: f64,
    pub(crate) max_lng: f64,
    pub(crate) limit: usize,
    /// Database to save the listed venues into.
    pub(crate) save: Option<Utf8PathBuf>,
    pub(crate) chain: ChainSettings,
}

impl TryFrom<BoundsArgs> for BoundsConfig {
    type Error = CliError;

    fn try_from(args: BoundsArgs) -> Result<Self, Self::Error> {
        let min_lat = args.min_lat.ok_or(CliError::MissingArgument {
            field: ARG_MIN_LAT,
            env: ENV_BOUNDS_MIN_LAT,
        })?;
        let max_lat = args.max_lat.ok_or(CliError::MissingArgument {
            field: ARG_MAX_LAT,
            env: ENV_BOUNDS_MAX_LAT,
        })?;
        let min_lng = args.min_lng.ok_or(CliError::MissingArgument {
            field: ARG_MIN_LNG,
            env: ENV_BOUNDS_MIN_LNG,
        })?;
        let max_lng = args.max_lng.ok_or(CliError::MissingArgument {
            field: ARG_MAX_LNG,
            env: ENV_BOUNDS_MAX_LNG,
        })?;
        let chain = ChainSettings::try_from(ProviderFields {
            database: args.database,
            providers: args.providers,
            timeout_secs: args.timeout_secs,
            goong_api_key: args.goong_api_key,
            goong_url: args.goong_url,
            overpass_url: args.overpass_url,
            geocoder_url: args.geocoder_url,
        })?;
        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
            limit: args.limit.unwrap_or(DEFAULT_BOUNDS_LIMIT),
            save: args.save,
            chain,
        })
    }
}

#[derive(Debug, Serialize)]
struct BoundsOutput<'a> {
    places: &'a [Place],
}

pub(super) fn run_bounds(args: BoundsArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_bounds_with(args, &DefaultChainBuilder, &mut stdout)
}

pub(super) fn run_bounds_with(
    args: BoundsArgs,
    builder: &dyn ChainBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let places = execute_bounds(&config, builder)?;
    if let Some(path) = &config.save {
        persist_places_to_sqlite(path, &places).map_err(|source| CliError::PersistPlaces {
            path: path.clone(),
            source,
        })?;
        info!("saved {} place(s) to {path}", places.len());
    }
    write_json(writer, &BoundsOutput { places: &places })
}

fn execute_bounds(config: &BoundsConfig, builder: &dyn ChainBuilder) -> Result<Vec<Place>, CliError> {
    config.chain.validate_sources()?;
    let search = ProgressiveSearch::new(builder.build(&config.chain)?);
    let places = block_on(search.bounds(
        config.min_lat,
        config.max_lat,
        config.min_lng,
        config.max_lng,
        config.limit,
    ))??;
    info!("listed {} place(s) inside the bounds", places.len());
    Ok(places)
}

#[cfg(test)]
pub(crate) fn bounds_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<BoundsConfig, CliError> {
    let merged = BoundsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    BoundsConfig::try_from(merged)
}
