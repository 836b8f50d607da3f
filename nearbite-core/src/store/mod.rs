//! In-memory spatial index over venue records.
//!
//! [`PlaceIndex`] keeps classified places in an R\*-tree keyed by longitude
//! and latitude. It is immutable once built, so concurrent requests share it
//! without locking. The SQLite provider loads its rows into one at open time.

use async_trait::async_trait;
use rstar::{AABB, RTree, RTreeObject};

use crate::{
    Bounds, Location, Place, PlaceProvider, ProviderError, SearchOptions, VenueKind,
    candidate::{CandidateFilter, pick_random},
    text::Keyword,
};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqlitePlaceStore, SqlitePlaceStoreError};

/// Radius used when a request leaves it unset.
pub const DEFAULT_INDEX_RADIUS_M: u32 = 5_000;

/// Maximum number of candidates `search_places` returns.
pub const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone)]
struct IndexedPlace {
    place: Place,
    kind: VenueKind,
}

impl RTreeObject for IndexedPlace {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.place.location.lng(), self.place.location.lat()])
    }
}

/// Classified places queryable by radius and rectangle.
///
/// # Examples
///
/// ```
/// use nearbite_core::{Bounds, Location, Place, PlaceIndex};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let here = Location::new(10.77, 106.70)?;
/// let index = PlaceIndex::classify([Place::new("1", here, "Cơm Tấm")]);
/// let bounds = Bounds::new(10.0, 11.0, 106.0, 107.0)?;
/// assert_eq!(index.within(bounds, 10).len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PlaceIndex {
    tree: RTree<IndexedPlace>,
}

impl Default for PlaceIndex {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl PlaceIndex {
    /// Index places whose venue kind is already known.
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (Place, VenueKind)>,
    {
        let entries = records
            .into_iter()
            .map(|(place, kind)| IndexedPlace { place, kind })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index untagged places, classifying each from its name and category.
    pub fn classify<I>(places: I) -> Self
    where
        I: IntoIterator<Item = Place>,
    {
        Self::new(places.into_iter().map(|place| {
            let kind = VenueKind::from_text(&place.name, place.category.as_deref());
            (place, kind)
        }))
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Every qualifying candidate, nearest first.
    #[must_use]
    pub fn candidates(
        &self,
        origin: Location,
        options: &SearchOptions,
        keyword: Option<Keyword>,
    ) -> Vec<Place> {
        let base = CandidateFilter::new(origin, options, DEFAULT_INDEX_RADIUS_M);
        let filter = match keyword {
            Some(required) => base.with_keyword(required),
            None => base,
        };
        let envelope = envelope_of(Bounds::around(origin, filter.radius_m()));
        let mut places = filter.collect(
            self.tree
                .locate_in_envelope_intersecting(&envelope)
                .map(|entry| (entry.place.clone(), entry.kind)),
        );
        places.sort_by(|a, b| distance_key(a).total_cmp(&distance_key(b)));
        places
    }

    /// Up to `limit` places inside `bounds`, ordered by id.
    #[must_use]
    pub fn within(&self, bounds: Bounds, limit: usize) -> Vec<Place> {
        let mut places: Vec<Place> = self
            .tree
            .locate_in_envelope_intersecting(&envelope_of(bounds))
            .filter(|entry| bounds.contains(entry.place.location))
            .map(|entry| entry.place.clone())
            .collect();
        places.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        places.truncate(limit);
        places
    }
}

fn distance_key(place: &Place) -> f64 {
    place.distance_km.unwrap_or(f64::INFINITY)
}

fn envelope_of(bounds: Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bounds.min_lng(), bounds.min_lat()],
        [bounds.max_lng(), bounds.max_lat()],
    )
}

#[async_trait]
impl PlaceProvider for PlaceIndex {
    fn name(&self) -> &str {
        "index"
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        let mut places = self.candidates(origin, options, None);
        places.truncate(SEARCH_LIMIT);
        Ok(places)
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        let candidates = self.candidates(origin, options, None);
        Ok(pick_random(candidates, &mut rand::thread_rng()))
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
        let candidates = self.candidates(origin, options, Some(folded));
        Ok(pick_random(candidates, &mut rand::thread_rng()))
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        Ok(self.within(bounds, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistanceTier, VenueFilter, test_support::place_north_of};
    use rstest::{fixture, rstest};

    #[fixture]
    fn origin() -> Location {
        Location::new(10.77, 106.70).expect("valid origin")
    }

    #[fixture]
    fn index(origin: Location) -> PlaceIndex {
        PlaceIndex::classify([
            place_north_of(origin, "near-food", "Cơm Gà", 300.0),
            place_north_of(origin, "near-drink", "Cà Phê Vợt", 800.0),
            place_north_of(origin, "mid-food", "Phở Lệ", 2_500.0),
            place_north_of(origin, "far-food", "Phở Phú Vương", 8_000.0),
        ])
    }

    #[rstest]
    fn candidates_are_sorted_by_distance(origin: Location, index: PlaceIndex) {
        let ids: Vec<String> = index
            .candidates(origin, &SearchOptions::default(), None)
            .into_iter()
            .map(|place| place.id)
            .collect();
        assert_eq!(ids, ["near-food", "near-drink", "mid-food"]);
    }

    #[rstest]
    fn far_tier_only_sees_far_places(origin: Location, index: PlaceIndex) {
        let options = SearchOptions::default().with_tier(DistanceTier::Far);
        let places = index.candidates(origin, &options, None);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "far-food");
    }

    #[rstest]
    fn drink_filter_uses_keyword_classification(origin: Location, index: PlaceIndex) {
        let options = SearchOptions::default().with_filter(VenueFilter::Drink);
        let places = index.candidates(origin, &options, None);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "near-drink");
    }

    #[rstest]
    #[tokio::test]
    async fn keyword_search_is_accent_insensitive(origin: Location, index: PlaceIndex) {
        let options = SearchOptions::default().with_radius(3_000);
        let found = index
            .search_by_keyword(origin, "PHO", &options)
            .await
            .expect("index never fails");
        assert_eq!(found.map(|place| place.id).as_deref(), Some("mid-food"));
    }

    #[rstest]
    fn bounds_results_are_stable(index: PlaceIndex) {
        let bounds = Bounds::new(10.0, 11.0, 106.0, 107.0).expect("valid bounds");
        let first = index.within(bounds, 3);
        let second = index.within(bounds, 3);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[rstest]
    fn bounds_include_the_boundary(origin: Location, index: PlaceIndex) {
        let bounds = Bounds::new(origin.lat(), origin.lat(), origin.lng(), origin.lng())
            .expect("degenerate bounds are valid");
        assert!(index.within(bounds, 10).is_empty());
        let exact = PlaceIndex::classify([place_north_of(origin, "here", "Here", 0.0)]);
        assert_eq!(exact.within(bounds, 10).len(), 1);
    }
}
