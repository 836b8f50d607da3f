//! Building a [`ProviderChain`] from a [`ChainConfig`].
//!
//! A variant named in the configuration but lacking what it needs (a
//! database path, an API key) or whose database cannot be opened is skipped
//! with a warning, so a partially configured deployment still serves
//! requests from whatever remains.

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use log::{info, warn};
use nearbite_core::{ChainConfig, PlaceProvider, ProviderChain, ProviderKind, SqlitePlaceStore};
use thiserror::Error;

use crate::{
    geocode::{BigDataCloudGeocoder, ReverseGeocoderConfig},
    goong::{GoongConfig, GoongPlaceProvider},
    overpass::{OverpassConfig, OverpassPlaceProvider},
    transport::ProviderBuildError,
};

/// Per-variant settings consulted by [`build_chain`].
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Place database for the `sqlite` variant.
    pub database: Option<PathBuf>,
    /// Goong settings; `None` disables the `goong` variant.
    pub goong: Option<GoongConfig>,
    /// Overpass settings.
    pub overpass: OverpassConfig,
    /// Reverse geocoder used to address Overpass results; `None` falls back
    /// to OSM address tags.
    pub geocoder: Option<ReverseGeocoderConfig>,
}

impl ProviderSettings {
    /// Read places from the database at `path`.
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Enable Goong with `config`.
    #[must_use]
    pub fn with_goong(mut self, config: GoongConfig) -> Self {
        self.goong = Some(config);
        self
    }

    /// Replace the Overpass settings.
    #[must_use]
    pub fn with_overpass(mut self, config: OverpassConfig) -> Self {
        self.overpass = config;
        self
    }

    /// Enable reverse geocoding with `config`.
    #[must_use]
    pub fn with_geocoder(mut self, config: ReverseGeocoderConfig) -> Self {
        self.geocoder = Some(config);
        self
    }
}

/// Errors raised by [`build_chain`].
#[derive(Debug, Error)]
pub enum ChainBuildError {
    /// A configured provider could not be constructed.
    #[error("failed to build {provider} provider")]
    Provider {
        /// Variant that failed.
        provider: ProviderKind,
        /// Underlying construction error.
        #[source]
        source: ProviderBuildError,
    },
    /// Every requested variant was skipped.
    #[error("none of the requested providers ({requested}) is configured")]
    Empty {
        /// Comma-separated requested order.
        requested: String,
    },
}

/// Build the chain named by `config` from `settings`.
///
/// Repeated variants keep their first position.
///
/// # Errors
///
/// Returns [`ChainBuildError::Provider`] when an HTTP provider fails to
/// build and [`ChainBuildError::Empty`] when no variant remains.
pub fn build_chain(
    config: &ChainConfig,
    settings: &ProviderSettings,
) -> Result<ProviderChain, ChainBuildError> {
    let mut seen = HashSet::new();
    let mut links: Vec<Arc<dyn PlaceProvider>> = Vec::new();
    for kind in &config.providers {
        if !seen.insert(*kind) {
            continue;
        }
        if let Some(provider) = build_link(*kind, settings)? {
            links.push(provider);
        }
    }

    if links.is_empty() {
        let requested: Vec<String> = config.providers.iter().map(ToString::to_string).collect();
        return Err(ChainBuildError::Empty {
            requested: requested.join(","),
        });
    }

    let chain = ProviderChain::new(links).with_timeout(config.timeout);
    info!(
        "provider chain: {} (timeout {} ms)",
        chain.names().join(" -> "),
        chain.timeout().as_millis()
    );
    Ok(chain)
}

fn build_link(
    kind: ProviderKind,
    settings: &ProviderSettings,
) -> Result<Option<Arc<dyn PlaceProvider>>, ChainBuildError> {
    let wrap = |source| ChainBuildError::Provider {
        provider: kind,
        source,
    };
    match kind {
        ProviderKind::Sqlite => Ok(open_store(settings)),
        ProviderKind::Goong => match &settings.goong {
            Some(config) if !config.api_key.trim().is_empty() => {
                let provider = GoongPlaceProvider::new(config.clone()).map_err(wrap)?;
                Ok(Some(Arc::new(provider)))
            }
            _ => {
                warn!("skipping goong provider: no API key configured");
                Ok(None)
            }
        },
        ProviderKind::Overpass => {
            let mut provider =
                OverpassPlaceProvider::new(settings.overpass.clone()).map_err(wrap)?;
            if let Some(config) = &settings.geocoder {
                let geocoder = BigDataCloudGeocoder::new(config.clone()).map_err(wrap)?;
                provider = provider.with_geocoder(Arc::new(geocoder));
            }
            Ok(Some(Arc::new(provider)))
        }
    }
}

fn open_store(settings: &ProviderSettings) -> Option<Arc<dyn PlaceProvider>> {
    let Some(path) = &settings.database else {
        warn!("skipping sqlite provider: no database path configured");
        return None;
    };
    match SqlitePlaceStore::open(path) {
        Ok(store) => Some(Arc::new(store)),
        Err(err) => {
            warn!("skipping sqlite provider: {err}");
            None
        }
    }
}
