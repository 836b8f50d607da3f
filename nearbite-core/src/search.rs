//! Progressive-radius discovery on top of any [`PlaceProvider`].
//!
//! A request walks its tier's radius ladder in ascending order, one rung at a
//! time, and stops at the first rung that yields a venue. Provider errors
//! and timeouts count as misses. The caller's exclusion set travels
//! unchanged to every rung.

use std::{future::Future, time::Duration};

use log::{debug, warn};
use thiserror::Error;

use crate::{
    Bounds, BoundsError, DistanceTier, Location, LocationError, Place, PlaceProvider,
    ProviderError, SearchOptions, VenueFilter, candidate::CandidateFilter, text::Keyword,
};

/// Default number of places returned by bounds discovery.
pub const DEFAULT_BOUNDS_LIMIT: usize = 50;

/// Invalid input rejected before any provider is called.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The origin was not a valid coordinate.
    #[error("invalid origin: {0}")]
    InvalidLocation(#[from] LocationError),
    /// The bounding box was malformed.
    #[error("invalid bounds: {0}")]
    InvalidBounds(#[from] BoundsError),
    /// The keyword was blank.
    #[error("keyword must contain at least one non-space character")]
    EmptyKeyword,
    /// A bounds query asked for zero places.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Inputs for random and keyword discovery.
///
/// # Examples
///
/// ```
/// use nearbite_core::{DiscoveryRequest, DistanceTier, VenueFilter};
///
/// # fn main() -> Result<(), nearbite_core::SearchError> {
/// let request = DiscoveryRequest::at(10.77, 106.70)?
///     .with_filter(VenueFilter::Drink)
///     .with_tier(DistanceTier::Far)
///     .excluding(["osm-node-7"]);
/// assert_eq!(request.options().exclude_ids.len(), 1);
/// assert!(DiscoveryRequest::at(120.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    origin: Location,
    options: SearchOptions,
}

impl DiscoveryRequest {
    /// Validate the origin and start a request with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidLocation`] when the coordinate is out
    /// of range.
    pub fn at(lat: f64, lng: f64) -> Result<Self, SearchError> {
        Ok(Self::from_location(Location::new(lat, lng)?))
    }

    /// Start a request at an already validated origin.
    #[must_use]
    pub fn from_location(origin: Location) -> Self {
        Self {
            origin,
            options: SearchOptions::default(),
        }
    }

    /// Set the venue filter.
    #[must_use]
    pub fn with_filter(mut self, filter: VenueFilter) -> Self {
        self.options.filter = filter;
        self
    }

    /// Set the distance tier, which also selects the radius ladder.
    #[must_use]
    pub fn with_tier(mut self, tier: DistanceTier) -> Self {
        self.options.tier = tier;
        self
    }

    /// Add previously shown ids to the exclusion set.
    #[must_use]
    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.excluding(ids);
        self
    }

    /// Drop candidates closer than `min_distance_m`.
    #[must_use]
    pub fn with_min_distance(mut self, min_distance_m: u32) -> Self {
        self.options.min_distance_m = Some(min_distance_m);
        self
    }

    /// The search origin.
    #[must_use]
    pub const fn origin(&self) -> Location {
        self.origin
    }

    /// The caller's options, before per-rung adjustment.
    #[must_use]
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn rung_options(&self, radius_m: u32) -> SearchOptions {
        SearchOptions {
            radius_m: Some(radius_m),
            min_distance_m: self.options.effective_min_distance_m(),
            ..self.options.clone()
        }
    }
}

/// Outcome of random or keyword discovery.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Discovery {
    /// The venue found, or `None` when the whole ladder was exhausted.
    pub place: Option<Place>,
    /// Radius of the rung that produced `place`.
    pub radius_m: Option<u32>,
    /// How many rungs were attempted.
    pub rungs_tried: usize,
}

impl Discovery {
    /// Whether a venue was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.place.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode<'a> {
    Random,
    Keyword(&'a str),
}

/// Drives radius escalation over a provider, usually a
/// [`crate::ProviderChain`].
#[derive(Debug, Clone)]
pub struct ProgressiveSearch<P> {
    provider: P,
    rung_timeout: Option<Duration>,
}

impl<P> ProgressiveSearch<P>
where
    P: PlaceProvider,
{
    /// Search through `provider`.
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            rung_timeout: None,
        }
    }

    /// Bound each rung's provider call. Useful when `provider` is a single
    /// source rather than a chain that already enforces timeouts.
    #[must_use]
    pub const fn with_rung_timeout(mut self, timeout: Duration) -> Self {
        self.rung_timeout = Some(timeout);
        self
    }

    /// The wrapped provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Find a random venue, widening the radius until one qualifies.
    pub async fn random(&self, request: &DiscoveryRequest) -> Discovery {
        self.climb(request, Mode::Random).await
    }

    /// Find a venue matching `keyword`, widening the radius until one
    /// qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyKeyword`] for a blank keyword without
    /// calling the provider.
    pub async fn keyword(
        &self,
        request: &DiscoveryRequest,
        keyword: &str,
    ) -> Result<Discovery, SearchError> {
        let trimmed = keyword.trim();
        if Keyword::new(trimmed).is_none() {
            return Err(SearchError::EmptyKeyword);
        }
        Ok(self.climb(request, Mode::Keyword(trimmed)).await)
    }

    /// List up to `limit` venues inside a rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidBounds`] for out-of-range or inverted
    /// corners and [`SearchError::ZeroLimit`] when `limit` is zero.
    pub async fn bounds(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
        limit: usize,
    ) -> Result<Vec<Place>, SearchError> {
        let bounds = Bounds::new(min_lat, max_lat, min_lng, max_lng)?;
        if limit == 0 {
            return Err(SearchError::ZeroLimit);
        }
        let call = self.provider.search_by_bounds(bounds, limit);
        let mut places = match self.bounded(call).await {
            Ok(places) => places,
            Err(err) => {
                warn!("{} failed during search_by_bounds: {err}", self.provider.name());
                Vec::new()
            }
        };
        places.retain(|place| bounds.contains(place.location));
        places.truncate(limit);
        Ok(places)
    }

    async fn climb(&self, request: &DiscoveryRequest, mode: Mode<'_>) -> Discovery {
        let origin = request.origin();
        let mut rungs_tried = 0;
        for &radius_m in request.options.tier.ladder() {
            rungs_tried += 1;
            let options = request.rung_options(radius_m);
            let outcome = match mode {
                Mode::Random => {
                    let call = self.provider.find_random_place(origin, &options);
                    self.bounded(call).await
                }
                Mode::Keyword(keyword) => {
                    let call = self.provider.search_by_keyword(origin, keyword, &options);
                    self.bounded(call).await
                }
            };
            match outcome {
                Ok(Some(place)) if CandidateFilter::new(origin, &options, radius_m).honours(&place) => {
                    debug!("found {} at rung {radius_m} m", place.id);
                    return Discovery {
                        place: Some(place),
                        radius_m: Some(radius_m),
                        rungs_tried,
                    };
                }
                Ok(Some(place)) => warn!(
                    "{} returned {} outside the exclusion set or distance band at {radius_m} m",
                    self.provider.name(),
                    place.id
                ),
                Ok(None) => debug!("no venue within {radius_m} m"),
                Err(err) => warn!(
                    "{} failed at rung {radius_m} m: {err}",
                    self.provider.name()
                ),
            }
        }
        Discovery {
            place: None,
            radius_m: None,
            rungs_tried,
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let Some(timeout) = self.rung_timeout else {
            return call.await;
        };
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout {
                    target: self.provider.name().to_owned(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}
