//! Venue search over OpenStreetMap data via the Overpass API.
//!
//! Each radius request becomes one Overpass QL union of `around:` filters,
//! one per amenity the venue filter admits. Results pass through the shared
//! candidate filter, and a randomly selected venue is address-enriched via
//! an optional [`ReverseGeocoder`] before it is returned.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nearbite_core::{Location, PlaceProvider, SearchOptions};
//! use nearbite_data::geocode::{BigDataCloudGeocoder, ReverseGeocoderConfig};
//! use nearbite_data::overpass::{OverpassConfig, OverpassPlaceProvider};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = BigDataCloudGeocoder::new(ReverseGeocoderConfig::default())?;
//! let provider = OverpassPlaceProvider::new(OverpassConfig::default())?
//!     .with_geocoder(Arc::new(geocoder));
//! let origin = Location::new(10.7769, 106.7009)?;
//! let place = provider
//!     .find_random_place(origin, &SearchOptions::default().with_radius(1_000))
//!     .await?;
//! # let _ = place;
//! # Ok(())
//! # }
//! ```

mod api;
mod query;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use nearbite_core::{
    ALL_AMENITIES, Bounds, CandidateFilter, Location, Place, PlaceProvider, ProviderError,
    ReverseGeocoder, SearchOptions, enrich_address, pick_random, text::Keyword,
};
use url::Url;

use self::api::{Element, OsmRecord, OverpassResponse};
use self::query::{around_query, bounds_query};
use crate::transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTransport, ProviderBuildError, Transport,
    endpoint, fetch_json, redacted,
};

/// Public Overpass interpreter.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Radius applied when a request leaves it unset.
pub const DEFAULT_OVERPASS_RADIUS_M: u32 = 1_500;

/// Server-side query budget passed in the `[timeout:..]` setting.
pub const DEFAULT_SERVER_TIMEOUT_SECS: u32 = 25;

const SERVICE: &str = "overpass";

/// Configuration for [`OverpassPlaceProvider`].
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Interpreter endpoint (e.g. `"https://overpass-api.de/api/interpreter"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Budget the interpreter may spend on one query.
    pub server_timeout_secs: u32,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OVERPASS_URL)
    }
}

impl OverpassConfig {
    /// Create a configuration for the interpreter at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            server_timeout_secs: DEFAULT_SERVER_TIMEOUT_SECS,
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

    /// Set the interpreter's query budget.
    #[must_use]
    pub fn with_server_timeout(mut self, seconds: u32) -> Self {
        self.server_timeout_secs = seconds;
        self
    }
}

/// [`PlaceProvider`] backed by an Overpass interpreter.
pub struct OverpassPlaceProvider {
    interpreter: Url,
    server_timeout_secs: u32,
    transport: Arc<dyn Transport>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
}

impl std::fmt::Debug for OverpassPlaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassPlaceProvider")
            .field("interpreter", &self.interpreter.as_str())
            .field("server_timeout_secs", &self.server_timeout_secs)
            .field("geocoder", &self.geocoder.is_some())
            .finish_non_exhaustive()
    }
}

impl OverpassPlaceProvider {
    /// Create a provider issuing real HTTP requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the interpreter
    /// URL does not parse.
    pub fn new(config: OverpassConfig) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config.user_agent, config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a provider sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter URL does not parse.
    pub fn with_transport(
        config: OverpassConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            interpreter: endpoint(&config.base_url, "")?,
            server_timeout_secs: config.server_timeout_secs,
            transport,
            geocoder: None,
        })
    }

    /// Resolve addresses of selected venues through `geocoder`.
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    async fn run(&self, ql: &str) -> Result<Vec<OsmRecord>, ProviderError> {
        let mut url = self.interpreter.clone();
        url.query_pairs_mut().append_pair("data", ql);
        let response: OverpassResponse = fetch_json(self.transport.as_ref(), &url).await?;
        if response.elements.is_empty()
            && let Some(remark) = response.remark
        {
            return Err(ProviderError::Service {
                service: SERVICE.to_owned(),
                code: "remark".to_owned(),
                message: remark,
            });
        }
        let total = response.elements.len();
        let records: Vec<OsmRecord> = response
            .elements
            .into_iter()
            .filter_map(Element::into_record)
            .collect();
        debug!(
            "{} returned {total} elements, {} usable venues",
            redacted(&url),
            records.len()
        );
        Ok(records)
    }

    /// Qualifying candidates around `origin`, still carrying their tags.
    async fn nearby(
        &self,
        origin: Location,
        options: &SearchOptions,
        keyword: Option<Keyword>,
    ) -> Result<Vec<OsmRecord>, ProviderError> {
        let mut filter = CandidateFilter::new(origin, options, DEFAULT_OVERPASS_RADIUS_M);
        if let Some(required) = keyword {
            filter = filter.with_keyword(required);
        }
        let ql = around_query(
            origin,
            filter.radius_m(),
            filter.filter().amenities(),
            self.server_timeout_secs,
        );
        let records = self.run(&ql).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let OsmRecord { place, kind, tags } = record;
                filter
                    .admit(place, kind)
                    .map(|admitted| OsmRecord {
                        place: admitted,
                        kind,
                        tags,
                    })
            })
            .collect())
    }

    /// Attach the best available address to a selected venue.
    async fn enrich(&self, record: OsmRecord) -> Place {
        let OsmRecord { mut place, tags, .. } = record;
        if let Some(address) =
            enrich_address(self.geocoder.as_deref(), place.location, &tags).await
        {
            place.address = Some(address);
        }
        place
    }

    async fn pick(
        &self,
        origin: Location,
        options: &SearchOptions,
        keyword: Option<Keyword>,
    ) -> Result<Option<Place>, ProviderError> {
        let candidates = self.nearby(origin, options, keyword).await?;
        let chosen = pick_random(candidates, &mut rand::thread_rng());
        match chosen {
            Some(record) => Ok(Some(self.enrich(record).await)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PlaceProvider for OverpassPlaceProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        let records = self.nearby(origin, options, None).await?;
        Ok(records
            .into_iter()
            .map(OsmRecord::into_tagged_place)
            .collect())
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.pick(origin, options, None).await
    }

    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        let Some(folded) = Keyword::new(keyword) else {
            return Ok(None);
        };
        self.pick(origin, options, Some(folded)).await
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        let ql = bounds_query(&bounds, &ALL_AMENITIES, self.server_timeout_secs);
        let mut places: Vec<Place> = self
            .run(&ql)
            .await?
            .into_iter()
            .map(OsmRecord::into_tagged_place)
            .filter(|place| bounds.contains(place.location))
            .collect();
        places.sort_by(|left, right| left.id.cmp(&right.id));
        places.truncate(limit);
        Ok(places)
    }
}
