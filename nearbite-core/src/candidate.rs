//! Turning raw provider records into admissible candidates.
//!
//! Every provider funnels its records through [`CandidateFilter`] so the
//! exclusion set, the distance band, the tier boundary and keyword matching
//! are enforced identically regardless of where the data came from.

use rand::Rng;

use crate::{Location, Place, SearchOptions, VenueFilter, VenueKind, text::Keyword};

/// Filters candidates against one request's [`SearchOptions`].
#[derive(Debug, Clone)]
pub struct CandidateFilter<'a> {
    origin: Location,
    options: &'a SearchOptions,
    radius_m: u32,
    min_distance_m: Option<u32>,
    keyword: Option<Keyword>,
}

impl<'a> CandidateFilter<'a> {
    /// Build a filter using `default_radius_m` when `options` sets none.
    ///
    /// `options.keyword` is picked up when it folds to something non-empty.
    #[must_use]
    pub fn new(origin: Location, options: &'a SearchOptions, default_radius_m: u32) -> Self {
        Self {
            origin,
            options,
            radius_m: options.radius_or(default_radius_m),
            min_distance_m: options.effective_min_distance_m(),
            keyword: options.keyword.as_deref().and_then(Keyword::new),
        }
    }

    /// Require `keyword`, replacing any keyword taken from the options.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    /// The search radius in metres.
    #[must_use]
    pub const fn radius_m(&self) -> u32 {
        self.radius_m
    }

    /// The venue filter in force.
    #[must_use]
    pub const fn filter(&self) -> VenueFilter {
        self.options.filter
    }

    /// Whether `distance_m` lies inside the radius, the minimum distance and
    /// the tier.
    #[must_use]
    pub fn admits_distance(&self, distance_m: f64) -> bool {
        distance_m <= f64::from(self.radius_m)
            && self
                .min_distance_m
                .is_none_or(|min| distance_m >= f64::from(min))
            && self.options.tier.admits(distance_m)
    }

    /// Check a candidate, returning it with `distance_km` filled when it
    /// qualifies.
    #[must_use]
    pub fn admit(&self, place: Place, kind: VenueKind) -> Option<Place> {
        if !self.options.filter.accepts(kind) || self.options.is_excluded(&place.id) {
            return None;
        }
        if let Some(keyword) = &self.keyword {
            let secondary = [place.category.as_deref(), place.address.as_deref()];
            if !keyword.matches_any(&place.name, secondary) {
                return None;
            }
        }
        let distance_m = self.origin.distance_m(place.location);
        self.admits_distance(distance_m)
            .then(|| place.measured_from(self.origin))
    }

    /// Admit every qualifying candidate from `records`.
    pub fn collect<I>(&self, records: I) -> Vec<Place>
    where
        I: IntoIterator<Item = (Place, VenueKind)>,
    {
        records
            .into_iter()
            .filter_map(|(place, kind)| self.admit(place, kind))
            .collect()
    }

    /// Whether a place returned by some provider still honours these
    /// options. Used to reject results that ignored the exclusion set or the
    /// distance band.
    #[must_use]
    pub fn honours(&self, place: &Place) -> bool {
        !self.options.is_excluded(&place.id)
            && self.admits_distance(self.origin.distance_m(place.location))
    }
}

/// Choose one candidate uniformly at random.
///
/// # Examples
///
/// ```
/// use nearbite_core::{Location, Place, pick_random};
///
/// # fn main() -> Result<(), nearbite_core::LocationError> {
/// let here = Location::new(10.77, 106.70)?;
/// let places = vec![Place::new("a", here, "A"), Place::new("b", here, "B")];
/// let chosen = pick_random(places, &mut rand::thread_rng());
/// assert!(chosen.is_some());
/// assert!(pick_random(Vec::<Place>::new(), &mut rand::thread_rng()).is_none());
/// # Ok(())
/// # }
/// ```
pub fn pick_random<T, R>(mut candidates: Vec<T>, rng: &mut R) -> Option<T>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..candidates.len());
    Some(candidates.swap_remove(index))
}
