//! `random` and `keyword` command implementations.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use nearbite_core::{Discovery, DiscoveryRequest, ProgressiveSearch};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_EXCLUDE, ARG_FILTER, ARG_GEOCODER_URL, ARG_GOONG_API_KEY, ARG_GOONG_URL,
    ARG_KEYWORD, ARG_LAT, ARG_LNG, ARG_MIN_DISTANCE, ARG_OVERPASS_URL, ARG_PROVIDERS, ARG_TIER,
    ARG_TIMEOUT_SECS, CliError, ENV_KEYWORD_LAT, ENV_KEYWORD_LNG, ENV_KEYWORD_TEXT,
    ENV_RANDOM_LAT, ENV_RANDOM_LNG, block_on,
    providers::{ChainBuilder, ChainSettings, DefaultChainBuilder, ProviderFields},
    write_json,
};

/// CLI arguments for the `random` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "random",
    long_about = "Recommend a random venue near a location. The search starts \
                 at a small radius and widens through the distance tier's \
                 ladder until a venue turns up, trying each configured \
                 provider in order at every step.",
    about = "Recommend a random venue near a location"
)]
#[ortho_config(prefix = "NEARBITE")]
pub(crate) struct RandomArgs {
    /// Latitude of the search origin in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search origin in degrees.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Venue filter: `all`, `food` or `drink`.
    #[arg(long = ARG_FILTER, value_name = "filter")]
    #[serde(default)]
    pub(crate) filter: Option<String>,
    /// Distance tier: `near` (up to 5 km) or `far` (beyond 5 km).
    #[arg(long = ARG_TIER, value_name = "tier")]
    #[serde(default)]
    pub(crate) tier: Option<String>,
    /// Place identifiers to skip, e.g. ones already shown.
    #[arg(long = ARG_EXCLUDE, value_name = "id", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) exclude: Option<Vec<String>>,
    /// Skip venues closer than this many metres.
    #[arg(long = ARG_MIN_DISTANCE, value_name = "metres")]
    #[serde(default)]
    pub(crate) min_distance_m: Option<u32>,
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

impl RandomArgs {
    pub(crate) fn into_config(self) -> Result<DiscoverConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DiscoverConfig::try_from(merged)
    }
}

/// CLI arguments for the `keyword` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "keyword",
    long_about = "Find a venue whose name or category contains a keyword. \
                 Matching ignores case and Vietnamese diacritics, so \
                 \"banh mi\" finds \"Bánh Mì\". The radius widens exactly as \
                 for `random`.",
    about = "Find a venue matching a keyword"
)]
#[ortho_config(prefix = "NEARBITE")]
pub(crate) struct KeywordArgs {
    /// Text to look for in venue names and categories.
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) keyword: Option<String>,
    /// Latitude of the search origin in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search origin in degrees.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Venue filter: `all`, `food` or `drink`.
    #[arg(long = ARG_FILTER, value_name = "filter")]
    #[serde(default)]
    pub(crate) filter: Option<String>,
    /// Distance tier: `near` (up to 5 km) or `far` (beyond 5 km).
    #[arg(long = ARG_TIER, value_name = "tier")]
    #[serde(default)]
    pub(crate) tier: Option<String>,
    /// Place identifiers to skip, e.g. ones already shown.
    #[arg(long = ARG_EXCLUDE, value_name = "id", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) exclude: Option<Vec<String>>,
    /// Skip venues closer than this many metres.
    #[arg(long = ARG_MIN_DISTANCE, value_name = "metres")]
    #[serde(default)]
    pub(crate) min_distance_m: Option<u32>,
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

impl KeywordArgs {
    pub(crate) fn into_config(self) -> Result<DiscoverConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DiscoverConfig::try_from(merged)
    }
}

/// Resolved `random` or `keyword` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct DiscoverConfig {
    /// Origin and search options.
    pub(crate) request: DiscoveryRequest,
    /// Keyword to match; `None` for random discovery.
    pub(crate) keyword: Option<String>,
    /// Provider chain to search through.
    pub(crate) chain: ChainSettings,
}

/// Request options shared by `random` and `keyword`.
struct RequestFields {
    lat: Option<f64>,
    lng: Option<f64>,
    filter: Option<String>,
    tier: Option<String>,
    exclude: Option<Vec<String>>,
    min_distance_m: Option<u32>,
}

impl RequestFields {
    fn into_request(
        self,
        lat_env: &'static str,
        lng_env: &'static str,
    ) -> Result<DiscoveryRequest, CliError> {
        let lat = self.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: lat_env,
        })?;
        let lng = self.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: lng_env,
        })?;

        let mut request = DiscoveryRequest::at(lat, lng)?;
        if let Some(filter) = self.filter {
            request = request.with_filter(filter.parse()?);
        }
        if let Some(tier) = self.tier {
            request = request.with_tier(tier.parse()?);
        }
        if let Some(min_distance_m) = self.min_distance_m {
            request = request.with_min_distance(min_distance_m);
        }
        Ok(request.excluding(self.exclude.unwrap_or_default()))
    }
}

impl TryFrom<RandomArgs> for DiscoverConfig {
    type Error = CliError;

    fn try_from(args: RandomArgs) -> Result<Self, Self::Error> {
        let request = RequestFields {
            lat: args.lat,
            lng: args.lng,
            filter: args.filter,
            tier: args.tier,
            exclude: args.exclude,
            min_distance_m: args.min_distance_m,
        }
        .into_request(ENV_RANDOM_LAT, ENV_RANDOM_LNG)?;
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
            request,
            keyword: None,
            chain,
        })
    }
}

impl TryFrom<KeywordArgs> for DiscoverConfig {
    type Error = CliError;

    fn try_from(args: KeywordArgs) -> Result<Self, Self::Error> {
        let keyword = args.keyword.ok_or(CliError::MissingArgument {
            field: ARG_KEYWORD,
            env: ENV_KEYWORD_TEXT,
        })?;
        let request = RequestFields {
            lat: args.lat,
            lng: args.lng,
            filter: args.filter,
            tier: args.tier,
            exclude: args.exclude,
            min_distance_m: args.min_distance_m,
        }
        .into_request(ENV_KEYWORD_LAT, ENV_KEYWORD_LNG)?;
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
            request,
            keyword: Some(keyword),
            chain,
        })
    }
}

pub(super) fn run_random(args: RandomArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_random_with(args, &DefaultChainBuilder, &mut stdout)
}

pub(super) fn run_keyword(args: KeywordArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_keyword_with(args, &DefaultChainBuilder, &mut stdout)
}

pub(super) fn run_random_with(
    args: RandomArgs,
    builder: &dyn ChainBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let discovery = execute_discovery(&args.into_config()?, builder)?;
    write_json(writer, &discovery)
}

pub(super) fn run_keyword_with(
    args: KeywordArgs,
    builder: &dyn ChainBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let discovery = execute_discovery(&args.into_config()?, builder)?;
    write_json(writer, &discovery)
}

fn execute_discovery(
    config: &DiscoverConfig,
    builder: &dyn ChainBuilder,
) -> Result<Discovery, CliError> {
    config.chain.validate_sources()?;
    let search = ProgressiveSearch::new(builder.build(&config.chain)?);
    let discovery = match config.keyword.as_deref() {
        Some(keyword) => block_on(search.keyword(&config.request, keyword))??,
        None => block_on(search.random(&config.request))?,
    };
    match &discovery.place {
        Some(place) => info!(
            "found {} ({}) after {} rung(s)",
            place.name, place.id, discovery.rungs_tried
        ),
        None => info!("nothing found after {} rung(s)", discovery.rungs_tried),
    }
    Ok(discovery)
}

#[cfg(test)]
pub(crate) fn random_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<DiscoverConfig, CliError> {
    let merged = RandomArgs::merge_from_layers(layers).map_err(CliError::from)?;
    DiscoverConfig::try_from(merged)
}
