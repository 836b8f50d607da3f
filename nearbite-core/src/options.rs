//! Per-request search parameters passed to every provider call.

use std::collections::BTreeSet;

use crate::{DistanceTier, VenueFilter, tier::FAR_LADDER_M};

/// Options shared by the radius-based provider operations.
///
/// Providers receive these by reference and never mutate them. The
/// progressive search clones the caller's options once per rung, changing
/// only `radius_m` and `min_distance_m`.
///
/// # Examples
///
/// ```
/// use nearbite_core::{DistanceTier, SearchOptions, VenueFilter};
///
/// let options = SearchOptions::default()
///     .with_filter(VenueFilter::Food)
///     .with_tier(DistanceTier::Far)
///     .excluding(["osm-node-1"]);
/// assert!(options.is_excluded("osm-node-1"));
/// assert_eq!(options.effective_min_distance_m(), Some(5_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Venue kinds to consider.
    pub filter: VenueFilter,
    /// Near or far results.
    pub tier: DistanceTier,
    /// Optional text that candidates must contain.
    pub keyword: Option<String>,
    /// Ids the caller has already seen.
    pub exclude_ids: BTreeSet<String>,
    /// Search radius in metres; providers use their own default when unset.
    pub radius_m: Option<u32>,
    /// Candidates strictly closer than this are dropped.
    pub min_distance_m: Option<u32>,
}

impl SearchOptions {
    /// Set the venue filter.
    #[must_use]
    pub fn with_filter(mut self, filter: VenueFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the distance tier.
    #[must_use]
    pub fn with_tier(mut self, tier: DistanceTier) -> Self {
        self.tier = tier;
        self
    }

    /// Require candidates to match `keyword`.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Add ids to the exclusion set.
    #[must_use]
    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Set the search radius.
    #[must_use]
    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = Some(radius_m);
        self
    }

    /// Set the minimum distance.
    #[must_use]
    pub fn with_min_distance(mut self, min_distance_m: u32) -> Self {
        self.min_distance_m = Some(min_distance_m);
        self
    }

    /// Whether `id` is in the exclusion set.
    #[must_use]
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude_ids.contains(id)
    }

    /// The radius to search, falling back to `default_m`.
    ///
    /// An unset radius in the far tier never falls below the top of the far
    /// ladder, otherwise a small provider default would admit nothing.
    #[must_use]
    pub fn radius_or(&self, default_m: u32) -> u32 {
        self.radius_m.unwrap_or_else(|| match self.tier {
            DistanceTier::Near => default_m,
            DistanceTier::Far => FAR_LADDER_M
                .last()
                .map_or(default_m, |&top| default_m.max(top)),
        })
    }

    /// The larger of the explicit minimum distance and the tier floor.
    #[must_use]
    pub fn effective_min_distance_m(&self) -> Option<u32> {
        match (self.min_distance_m, self.tier.min_distance_m()) {
            (Some(explicit), Some(floor)) => Some(explicit.max(floor)),
            (explicit, floor) => explicit.or(floor),
        }
    }
}
