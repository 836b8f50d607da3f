//! Provider chain options shared by every discovery command.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use nearbite_core::{ChainConfig, DEFAULT_PROVIDER_TIMEOUT, ProviderChain};
use nearbite_data::{
    ProviderSettings, build_chain,
    geocode::ReverseGeocoderConfig,
    goong::GoongConfig,
    overpass::OverpassConfig,
};

use crate::{ARG_DATABASE, CliError};

/// Unresolved provider options lifted out of a subcommand's arguments.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProviderFields {
    pub(crate) database: Option<Utf8PathBuf>,
    pub(crate) providers: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) goong_api_key: Option<String>,
    pub(crate) goong_url: Option<String>,
    pub(crate) overpass_url: Option<String>,
    pub(crate) geocoder_url: Option<String>,
}

/// Resolved provider chain configuration.
#[derive(Debug, Clone)]
pub(crate) struct ChainSettings {
    /// Provider order and per-call timeout.
    pub(crate) chain: ChainConfig,
    /// Per-provider settings handed to [`build_chain`].
    pub(crate) providers: ProviderSettings,
    /// Place database named on the command line, if any.
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ChainSettings {
    /// Reject a configured database path that is missing or not a file.
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.database {
            Some(path) => require_existing(path, ARG_DATABASE),
            None => Ok(()),
        }
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match nearbite_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<ProviderFields> for ChainSettings {
    type Error = CliError;

    fn try_from(fields: ProviderFields) -> Result<Self, Self::Error> {
        let order = match fields.providers.as_deref() {
            Some(names) => ChainConfig::parse_order(names)?,
            None => ChainConfig::default().providers,
        };
        let timeout = match fields.timeout_secs {
            Some(0) => return Err(CliError::ZeroTimeout),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_PROVIDER_TIMEOUT,
        };

        let overpass = fields
            .overpass_url
            .map_or_else(OverpassConfig::default, OverpassConfig::new)
            .with_timeout(timeout);
        let geocoder = fields
            .geocoder_url
            .map_or_else(ReverseGeocoderConfig::default, ReverseGeocoderConfig::new)
            .with_timeout(timeout);
        let mut providers = ProviderSettings::default()
            .with_overpass(overpass)
            .with_geocoder(geocoder);
        if let Some(api_key) = fields.goong_api_key {
            let mut goong = GoongConfig::new(api_key).with_timeout(timeout);
            if let Some(base_url) = fields.goong_url {
                goong = goong.with_base_url(base_url);
            }
            providers = providers.with_goong(goong);
        }
        if let Some(path) = &fields.database {
            providers = providers.with_database(path.as_std_path());
        }

        Ok(Self {
            chain: ChainConfig {
                providers: order,
                timeout,
            },
            providers,
            database: fields.database,
        })
    }
}

/// Builds the provider chain for the current invocation.
pub(crate) trait ChainBuilder {
    fn build(&self, settings: &ChainSettings) -> Result<ProviderChain, CliError>;
}

pub(crate) struct DefaultChainBuilder;

impl ChainBuilder for DefaultChainBuilder {
    fn build(&self, settings: &ChainSettings) -> Result<ProviderChain, CliError> {
        build_chain(&settings.chain, &settings.providers).map_err(CliError::BuildChain)
    }
}
