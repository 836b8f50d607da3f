//! Reverse geocoding through BigDataCloud's client endpoint.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use nearbite_core::{AddressParts, GeocodeError, Location, ProviderError, ReverseGeocoder};
use serde::Deserialize;
use url::Url;

use crate::transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTransport, ProviderBuildError, Transport,
    endpoint, fetch_json, redacted,
};

/// Keyless client endpoint.
pub const DEFAULT_GEOCODER_URL: &str =
    "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// Language requested for locality names.
pub const DEFAULT_LOCALITY_LANGUAGE: &str = "vi";

/// Configuration for [`BigDataCloudGeocoder`].
#[derive(Debug, Clone)]
pub struct ReverseGeocoderConfig {
    /// Endpoint URL.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// `localityLanguage` parameter.
    pub locality_language: String,
}

impl Default for ReverseGeocoderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCODER_URL)
    }
}

impl ReverseGeocoderConfig {
    /// Create a configuration for the endpoint at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            locality_language: DEFAULT_LOCALITY_LANGUAGE.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the language used for locality names.
    #[must_use]
    pub fn with_locality_language(mut self, language: impl Into<String>) -> Self {
        self.locality_language = language.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
}

impl From<ReverseGeocodeResponse> for AddressParts {
    fn from(response: ReverseGeocodeResponse) -> Self {
        Self {
            locality: response.locality,
            city: response.city,
            region: response.principal_subdivision,
        }
    }
}

/// [`ReverseGeocoder`] backed by BigDataCloud.
pub struct BigDataCloudGeocoder {
    endpoint: Url,
    locality_language: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BigDataCloudGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigDataCloudGeocoder")
            .field("endpoint", &self.endpoint.as_str())
            .field("locality_language", &self.locality_language)
            .finish_non_exhaustive()
    }
}

impl BigDataCloudGeocoder {
    /// Create a geocoder issuing real HTTP requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the endpoint
    /// does not parse.
    pub fn new(config: ReverseGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config.user_agent, config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a geocoder sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not parse.
    pub fn with_transport(
        config: ReverseGeocoderConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            endpoint: endpoint(&config.base_url, "")?,
            locality_language: config.locality_language,
            transport,
        })
    }

    fn lookup_url(&self, location: Location) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &location.lat().to_string())
            .append_pair("longitude", &location.lng().to_string())
            .append_pair("localityLanguage", &self.locality_language);
        url
    }
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudGeocoder {
    async fn reverse(&self, location: Location) -> Result<AddressParts, GeocodeError> {
        let url = self.lookup_url(location);
        let response: ReverseGeocodeResponse = fetch_json(self.transport.as_ref(), &url)
            .await
            .map_err(|err| match err {
                ProviderError::Parse { message, .. } => GeocodeError::Malformed { message },
                other => GeocodeError::Unavailable {
                    url: redacted(&url),
                    message: other.to_string(),
                },
            })?;
        Ok(response.into())
    }
}
