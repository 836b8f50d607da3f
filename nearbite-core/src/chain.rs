//! First-success-wins composition of several providers.
//!
//! [`ProviderChain`] tries its links in priority order. A link that errors or
//! exceeds the per-call timeout is logged and skipped; the first non-empty
//! (or non-`None`) answer is returned unchanged. When every link comes up
//! empty the chain answers empty. It never returns an error.

use std::{fmt, future::Future, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{Bounds, Location, Operation, Place, PlaceProvider, ProviderError, SearchOptions};

/// Per-call time budget used when none is configured.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// An ordered list of providers sharing one [`PlaceProvider`] contract.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nearbite_core::{Location, ProviderChain, SearchOptions};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let chain = ProviderChain::new(Vec::new()).with_timeout(Duration::from_secs(2));
/// let origin = Location::new(10.77, 106.70).unwrap();
/// assert!(chain.find_random_place(origin, &SearchOptions::default()).await.is_none());
/// # });
/// ```
#[derive(Clone)]
pub struct ProviderChain {
    links: Vec<Arc<dyn PlaceProvider>>,
    timeout: Duration,
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("links", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderChain {
    /// Chain `links` in the given priority order.
    #[must_use]
    pub fn new(links: Vec<Arc<dyn PlaceProvider>>) -> Self {
        Self {
            links,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a lower-priority link.
    #[must_use]
    pub fn then(mut self, provider: Arc<dyn PlaceProvider>) -> Self {
        self.links.push(provider);
        self
    }

    /// Link names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the chain has no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First non-empty candidate list.
    pub async fn search_places(&self, origin: Location, options: &SearchOptions) -> Vec<Place> {
        for link in &self.links {
            let call = link.search_places(origin, options);
            match self.bounded(link.as_ref(), call).await {
                Ok(places) if !places.is_empty() => {
                    Self::note_success(link.as_ref(), Operation::SearchPlaces, options.radius_m);
                    return places;
                }
                Ok(_) => Self::note_empty(link.as_ref(), Operation::SearchPlaces, options.radius_m),
                Err(err) => {
                    Self::note_failure(link.as_ref(), Operation::SearchPlaces, options.radius_m, &err);
                }
            }
        }
        Vec::new()
    }

    /// First random pick any link produces.
    pub async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Option<Place> {
        for link in &self.links {
            let call = link.find_random_place(origin, options);
            match self.bounded(link.as_ref(), call).await {
                Ok(Some(place)) => {
                    Self::note_success(link.as_ref(), Operation::FindRandomPlace, options.radius_m);
                    return Some(place);
                }
                Ok(None) => {
                    Self::note_empty(link.as_ref(), Operation::FindRandomPlace, options.radius_m);
                }
                Err(err) => Self::note_failure(
                    link.as_ref(),
                    Operation::FindRandomPlace,
                    options.radius_m,
                    &err,
                ),
            }
        }
        None
    }

    /// First keyword match any link produces.
    pub async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Option<Place> {
        for link in &self.links {
            let call = link.search_by_keyword(origin, keyword, options);
            match self.bounded(link.as_ref(), call).await {
                Ok(Some(place)) => {
                    Self::note_success(link.as_ref(), Operation::SearchByKeyword, options.radius_m);
                    return Some(place);
                }
                Ok(None) => {
                    Self::note_empty(link.as_ref(), Operation::SearchByKeyword, options.radius_m);
                }
                Err(err) => Self::note_failure(
                    link.as_ref(),
                    Operation::SearchByKeyword,
                    options.radius_m,
                    &err,
                ),
            }
        }
        None
    }

    /// First non-empty list of places inside `bounds`.
    pub async fn search_by_bounds(&self, bounds: Bounds, limit: usize) -> Vec<Place> {
        for link in &self.links {
            let call = link.search_by_bounds(bounds, limit);
            match self.bounded(link.as_ref(), call).await {
                Ok(places) if !places.is_empty() => {
                    Self::note_success(link.as_ref(), Operation::SearchByBounds, None);
                    return places;
                }
                Ok(_) => Self::note_empty(link.as_ref(), Operation::SearchByBounds, None),
                Err(err) => Self::note_failure(link.as_ref(), Operation::SearchByBounds, None, &err),
            }
        }
        Vec::new()
    }

    async fn bounded<T, F>(&self, link: &dyn PlaceProvider, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout {
                    target: link.name().to_owned(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }

    fn note_success(link: &dyn PlaceProvider, operation: Operation, radius_m: Option<u32>) {
        info!(
            "provider {} answered {operation} (radius {})",
            link.name(),
            RadiusLabel(radius_m)
        );
    }

    fn note_empty(link: &dyn PlaceProvider, operation: Operation, radius_m: Option<u32>) {
        debug!(
            "provider {} had nothing for {operation} (radius {})",
            link.name(),
            RadiusLabel(radius_m)
        );
    }

    fn note_failure(
        link: &dyn PlaceProvider,
        operation: Operation,
        radius_m: Option<u32>,
        err: &ProviderError,
    ) {
        warn!(
            "provider {} failed during {operation} (radius {}): {err}",
            link.name(),
            RadiusLabel(radius_m)
        );
    }
}

struct RadiusLabel(Option<u32>);

impl fmt::Display for RadiusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(radius) => write!(f, "{radius} m"),
            None => f.write_str("default"),
        }
    }
}

#[async_trait]
impl PlaceProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        Ok(ProviderChain::search_places(self, origin, options).await)
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        Ok(ProviderChain::find_random_place(self, origin, options).await)
    }

    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        Ok(ProviderChain::search_by_keyword(self, origin, keyword, options).await)
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        Ok(ProviderChain::search_by_bounds(self, bounds, limit).await)
    }
}

/// A provider variant that can be named in a [`ChainConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProviderKind {
    /// Local SQLite place database.
    Sqlite,
    /// Goong commercial places API.
    Goong,
    /// Overpass OpenStreetMap query service.
    Overpass,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sqlite => "sqlite",
            Self::Goong => "goong",
            Self::Overpass => "overpass",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider {0:?} (expected \"sqlite\", \"goong\" or \"overpass\")")]
pub struct ParseProviderKindError(pub String);

impl FromStr for ProviderKind {
    type Err = ParseProviderKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "goong" => Ok(Self::Goong),
            "overpass" => Ok(Self::Overpass),
            _ => Err(ParseProviderKindError(value.to_owned())),
        }
    }
}

/// Which provider variants to chain, in what order, and how long each call
/// may take.
///
/// The default mirrors data quality and cost: the local database first, the
/// commercial API second and the public OSM service last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Provider variants in priority order.
    pub providers: Vec<ProviderKind>,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::Sqlite, ProviderKind::Goong, ProviderKind::Overpass],
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl ChainConfig {
    /// Parse a comma-separated provider order such as `"sqlite,overpass"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseProviderKindError`] for the first unknown name.
    pub fn parse_order(order: &str) -> Result<Vec<ProviderKind>, ParseProviderKindError> {
        order
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}
