use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{Bounds, Location, Place, SearchOptions};

use super::error::ProviderError;

/// The four provider operations, used when logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// [`PlaceProvider::search_places`].
    SearchPlaces,
    /// [`PlaceProvider::find_random_place`].
    FindRandomPlace,
    /// [`PlaceProvider::search_by_keyword`].
    SearchByKeyword,
    /// [`PlaceProvider::search_by_bounds`].
    SearchByBounds,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SearchPlaces => "search_places",
            Self::FindRandomPlace => "find_random_place",
            Self::SearchByKeyword => "search_by_keyword",
            Self::SearchByBounds => "search_by_bounds",
        };
        f.write_str(name)
    }
}

/// Look up venues from one data source.
///
/// Implementations must be safe to share between concurrent requests.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use nearbite_core::{
///     Bounds, Location, Place, PlaceProvider, ProviderError, SearchOptions,
/// };
///
/// struct Nowhere;
///
/// #[async_trait]
/// impl PlaceProvider for Nowhere {
///     fn name(&self) -> &str {
///         "nowhere"
///     }
///
///     async fn search_places(
///         &self,
///         _origin: Location,
///         _options: &SearchOptions,
///     ) -> Result<Vec<Place>, ProviderError> {
///         Ok(Vec::new())
///     }
///
///     async fn find_random_place(
///         &self,
///         _origin: Location,
///         _options: &SearchOptions,
///     ) -> Result<Option<Place>, ProviderError> {
///         Ok(None)
///     }
///
///     async fn search_by_keyword(
///         &self,
///         _origin: Location,
///         _keyword: &str,
///         _options: &SearchOptions,
///     ) -> Result<Option<Place>, ProviderError> {
///         Ok(None)
///     }
///
///     async fn search_by_bounds(
///         &self,
///         _bounds: Bounds,
///         _limit: usize,
///     ) -> Result<Vec<Place>, ProviderError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Candidates within `options.radius_m` that pass the filter, tier and
    /// keyword. Order is provider-defined.
    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError>;

    /// One qualifying candidate chosen uniformly at random, or `None`.
    ///
    /// Never returns an id in `options.exclude_ids` or a place closer than
    /// the effective minimum distance.
    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError>;

    /// As [`Self::find_random_place`], restricted to candidates whose folded
    /// name, category or address contains the folded `keyword`.
    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError>;

    /// Up to `limit` places inside `bounds`, without randomisation.
    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError>;
}

#[async_trait]
impl<T> PlaceProvider for Arc<T>
where
    T: PlaceProvider + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        (**self).search_places(origin, options).await
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        (**self).find_random_place(origin, options).await
    }

    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        (**self).search_by_keyword(origin, keyword, options).await
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        (**self).search_by_bounds(bounds, limit).await
    }
}
