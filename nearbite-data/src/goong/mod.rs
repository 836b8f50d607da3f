//! Keyword search through the Goong Place API.
//!
//! Goong is a Vietnamese commercial places service. Its autocomplete
//! endpoint matches free text near a location but omits coordinates, so each
//! shortlisted prediction is resolved through the detail endpoint before the
//! shared candidate filter runs. Without a keyword the provider has nothing
//! to ask and reports no results.
//!
//! # Example
//!
//! ```no_run
//! use nearbite_core::{Location, PlaceProvider, SearchOptions};
//! use nearbite_data::goong::{GoongConfig, GoongPlaceProvider};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GoongConfig::new("api-key").with_timeout(Duration::from_secs(5));
//! let provider = GoongPlaceProvider::new(config)?;
//! let origin = Location::new(10.7769, 106.7009)?;
//! let place = provider
//!     .search_by_keyword(origin, "phở", &SearchOptions::default())
//!     .await?;
//! # let _ = place;
//! # Ok(())
//! # }
//! ```

mod api;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use nearbite_core::{
    Bounds, CandidateFilter, Location, Place, PlaceProvider, ProviderError, SearchOptions,
    VenueKind, emoji_for, pick_random, text::Keyword,
};
use url::Url;

use self::api::{AutoCompleteResponse, DetailResponse, Prediction, ServiceFailure};
use crate::transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTransport, ProviderBuildError, Transport,
    endpoint, fetch_json,
};

/// Production endpoint of the Goong Place API.
pub const DEFAULT_GOONG_BASE_URL: &str = "https://rsapi.goong.io/Place";

/// Number of predictions resolved through the detail endpoint per search.
pub const DEFAULT_DETAIL_LIMIT: usize = 5;

/// Radius applied when a request leaves it unset.
pub const DEFAULT_GOONG_RADIUS_M: u32 = 5_000;

const SERVICE: &str = "goong";

/// Configuration for [`GoongPlaceProvider`].
#[derive(Clone)]
pub struct GoongConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL of the Place API (e.g. `"https://rsapi.goong.io/Place"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum predictions resolved to coordinates per search.
    pub detail_limit: usize,
}

impl std::fmt::Debug for GoongConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoongConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("detail_limit", &self.detail_limit)
            .finish()
    }
}

impl GoongConfig {
    /// Create a configuration for the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GOONG_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }

    /// Point the provider at another deployment.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
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

    /// Set how many predictions are resolved per search.
    #[must_use]
    pub fn with_detail_limit(mut self, detail_limit: usize) -> Self {
        self.detail_limit = detail_limit;
        self
    }
}

/// [`PlaceProvider`] backed by Goong autocomplete and place detail lookups.
pub struct GoongPlaceProvider {
    api_key: String,
    autocomplete: Url,
    detail: Url,
    detail_limit: usize,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for GoongPlaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoongPlaceProvider")
            .field("autocomplete", &self.autocomplete.as_str())
            .field("detail", &self.detail.as_str())
            .field("detail_limit", &self.detail_limit)
            .finish_non_exhaustive()
    }
}

impl GoongPlaceProvider {
    /// Create a provider issuing real HTTP requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the base URL
    /// does not parse.
    pub fn new(config: GoongConfig) -> Result<Self, ProviderBuildError> {
        let transport = HttpTransport::new(&config.user_agent, config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a provider sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn with_transport(
        config: GoongConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            autocomplete: endpoint(&config.base_url, "AutoComplete")?,
            detail: endpoint(&config.base_url, "Detail")?,
            api_key: config.api_key,
            detail_limit: config.detail_limit,
            transport,
        })
    }

    fn autocomplete_url(&self, origin: Location, input: &str) -> Url {
        let mut url = self.autocomplete.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("location", &format!("{},{}", origin.lat(), origin.lng()))
            .append_pair("input", input);
        url
    }

    fn detail_url(&self, place_id: &str) -> Url {
        let mut url = self.detail.clone();
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("api_key", &self.api_key);
        url
    }

    /// Autocomplete `input` near `origin` and resolve the shortlist.
    async fn resolve(
        &self,
        origin: Location,
        input: &str,
    ) -> Result<Vec<(Place, VenueKind)>, ProviderError> {
        let url = self.autocomplete_url(origin, input);
        let response: AutoCompleteResponse = fetch_json(self.transport.as_ref(), &url).await?;
        response.check().map_err(service_error)?;

        let mut records = Vec::new();
        for prediction in response.predictions.iter().take(self.detail_limit) {
            match self.lookup(prediction).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(
                    "goong prediction {} has no usable coordinates",
                    prediction.place_id
                ),
                Err(err) => debug!("goong detail for {} failed: {err}", prediction.place_id),
            }
        }
        Ok(records)
    }

    async fn lookup(
        &self,
        prediction: &Prediction,
    ) -> Result<Option<(Place, VenueKind)>, ProviderError> {
        let url = self.detail_url(&prediction.place_id);
        let response: DetailResponse = fetch_json(self.transport.as_ref(), &url).await?;
        response.check().map_err(service_error)?;

        let Some(result) = response.result else {
            return Ok(None);
        };
        let Some(location) = result
            .geometry
            .and_then(|geometry| Location::new(geometry.location.lat, geometry.location.lng).ok())
        else {
            return Ok(None);
        };

        let name = result
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| prediction.display_name().to_owned());
        let address = result
            .formatted_address
            .filter(|address| !address.trim().is_empty())
            .unwrap_or_else(|| prediction.description.clone());
        let kind = VenueKind::from_text(&name, None);
        let emoji = emoji_for(None, Some(kind.amenity()));

        let place = Place::new(prediction.place_id.as_str(), location, name)
            .with_address(address)
            .with_emoji(emoji)
            .with_external_ref(prediction.place_id.as_str());
        Ok(Some((place, kind)))
    }

    async fn candidates(
        &self,
        origin: Location,
        keyword: Keyword,
        raw_keyword: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        let records = self.resolve(origin, raw_keyword.trim()).await?;
        let filter =
            CandidateFilter::new(origin, options, DEFAULT_GOONG_RADIUS_M).with_keyword(keyword);
        Ok(filter.collect(records))
    }
}

fn service_error(failure: ServiceFailure) -> ProviderError {
    ProviderError::Service {
        service: SERVICE.to_owned(),
        code: failure.code,
        message: failure.message,
    }
}

#[async_trait]
impl PlaceProvider for GoongPlaceProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        let Some(raw) = options.keyword.as_deref() else {
            return Ok(Vec::new());
        };
        let Some(keyword) = Keyword::new(raw) else {
            return Ok(Vec::new());
        };
        self.candidates(origin, keyword, raw, options).await
    }

    async fn find_random_place(
        &self,
        _origin: Location,
        _options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        Ok(None)
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
        let candidates = self.candidates(origin, folded, keyword, options).await?;
        Ok(pick_random(candidates, &mut rand::thread_rng()))
    }

    async fn search_by_bounds(
        &self,
        _bounds: Bounds,
        _limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTransport;
    use rstest::{fixture, rstest};

    #[fixture]
    fn origin() -> Location {
        Location::new(10.7769, 106.7009).expect("valid origin")
    }

    fn provider(transport: StubTransport) -> GoongPlaceProvider {
        let config = GoongConfig::new("secret").with_base_url("https://goong.test/Place/");
        GoongPlaceProvider::with_transport(config, Arc::new(transport)).expect("provider")
    }

    #[rstest]
    fn autocomplete_url_carries_location_and_encoded_input(origin: Location) {
        let provider = provider(StubTransport::new());
        let url = provider.autocomplete_url(origin, "phở bò");
        assert_eq!(url.path(), "/Place/AutoComplete");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("api_key".to_owned(), "secret".to_owned()),
                ("location".to_owned(), "10.7769,106.7009".to_owned()),
                ("input".to_owned(), "phở bò".to_owned()),
            ]
        );
    }

    #[rstest]
    fn detail_url_names_place() {
        let provider = provider(StubTransport::new());
        let url = provider.detail_url("abc");
        assert_eq!(url.path(), "/Place/Detail");
        assert_eq!(url.query(), Some("place_id=abc&api_key=secret"));
    }

    #[rstest]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", GoongConfig::new("secret"));
        assert!(!rendered.contains("secret"));
    }

    #[rstest]
    #[tokio::test]
    async fn search_places_without_keyword_makes_no_request(origin: Location) {
        let transport = StubTransport::new();
        let provider = provider(transport.clone());
        let places = provider
            .search_places(origin, &SearchOptions::default())
            .await
            .expect("no error");
        assert!(places.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn keyword_search_resolves_coordinates(origin: Location) {
        let transport = StubTransport::new()
            .respond(
                "/Place/AutoComplete",
                r#"{"status":"OK","predictions":[
                    {"place_id":"p1","description":"Phở Hòa, Quận 3",
                     "structured_formatting":{"main_text":"Phở Hòa"}}]}"#,
            )
            .respond(
                "place_id=p1",
                r#"{"status":"OK","result":{"name":"Phở Hòa",
                    "formatted_address":"260C Pasteur, Quận 3",
                    "geometry":{"location":{"lat":10.7800,"lng":106.7009}}}}"#,
            );
        let provider = provider(transport);
        let place = provider
            .search_by_keyword(origin, "pho", &SearchOptions::default())
            .await
            .expect("no error")
            .expect("a place");
        assert_eq!(place.id, "p1");
        assert_eq!(place.address.as_deref(), Some("260C Pasteur, Quận 3"));
        assert_eq!(place.external_ref.as_deref(), Some("p1"));
        assert_eq!(place.emoji.as_deref(), Some("🍽️"));
        assert!(place.distance_km.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn drink_venues_get_the_cafe_emoji(origin: Location) {
        let transport = StubTransport::new()
            .respond(
                "/Place/AutoComplete",
                r#"{"status":"OK","predictions":[
                    {"place_id":"c1","description":"Trà Sữa Tocotoco, Quận 1"}]}"#,
            )
            .respond(
                "place_id=c1",
                r#"{"status":"OK","result":{"name":"Trà Sữa Tocotoco",
                    "geometry":{"location":{"lat":10.7790,"lng":106.7009}}}}"#,
            );
        let place = provider(transport)
            .search_by_keyword(origin, "tra sua", &SearchOptions::default())
            .await
            .expect("no error")
            .expect("a place");
        assert_eq!(place.emoji.as_deref(), Some("☕"));
    }

    #[rstest]
    #[tokio::test]
    async fn predictions_without_geometry_are_skipped(origin: Location) {
        let transport = StubTransport::new()
            .respond(
                "/Place/AutoComplete",
                r#"{"status":"OK","predictions":[{"place_id":"p1","description":"Phở"}]}"#,
            )
            .respond("place_id=p1", r#"{"status":"OK","result":{"name":"Phở"}}"#);
        let place = provider(transport)
            .search_by_keyword(origin, "pho", &SearchOptions::default())
            .await
            .expect("no error");
        assert!(place.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn detail_lookups_stop_at_limit(origin: Location) {
        let predictions: Vec<String> = (0..8)
            .map(|n| format!(r#"{{"place_id":"p{n}","description":"Quán {n}"}}"#))
            .collect();
        let body = format!(r#"{{"status":"OK","predictions":[{}]}}"#, predictions.join(","));
        let transport = StubTransport::new()
            .respond("/Place/AutoComplete", &body)
            .respond("/Place/Detail", r#"{"status":"OK"}"#);
        let provider = provider(transport.clone());
        let _ = provider
            .search_by_keyword(origin, "quan", &SearchOptions::default())
            .await;
        let detail_calls = transport
            .requests()
            .iter()
            .filter(|url| url.contains("/Place/Detail"))
            .count();
        assert_eq!(detail_calls, DEFAULT_DETAIL_LIMIT);
    }

    #[rstest]
    #[tokio::test]
    async fn denied_key_surfaces_as_service_error(origin: Location) {
        let transport = StubTransport::new().respond(
            "/Place/AutoComplete",
            r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#,
        );
        let err = provider(transport)
            .search_by_keyword(origin, "pho", &SearchOptions::default())
            .await
            .expect_err("service failure");
        assert!(matches!(err, ProviderError::Service { ref code, .. } if code == "REQUEST_DENIED"));
    }
}
