//! Test doubles for providers and geocoders, shared by unit and behaviour
//! tests here and in downstream crates.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    AddressParts, Bounds, GeocodeError, Location, Operation, Place, PlaceIndex, PlaceProvider,
    ProviderError, ReverseGeocoder, SearchOptions, VenueKind,
};

/// Metres per degree of latitude on the haversine mean sphere.
const HAVERSINE_METRES_PER_DEGREE: f64 = 111_195.0;

/// A place named `id` sitting exactly on `origin`.
#[must_use]
pub fn sample_place(id: &str, origin: Location) -> Place {
    Place::new(id, origin, id)
}

/// A place `metres` due north of `origin`.
///
/// Offsets that would leave the valid latitude range fall back to `origin`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "test geometry")]
pub fn place_north_of(origin: Location, id: &str, name: &str, metres: f64) -> Place {
    let lat = origin.lat() + metres / HAVERSINE_METRES_PER_DEGREE;
    let location = Location::new(lat, origin.lng()).unwrap_or(origin);
    Place::new(id, location, name)
}

/// One call observed by a recording provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Which operation was invoked.
    pub operation: Operation,
    /// Radius passed in the options.
    pub radius_m: Option<u32>,
    /// Minimum distance passed in the options.
    pub min_distance_m: Option<u32>,
    /// Exclusion set passed in the options.
    pub exclude_ids: BTreeSet<String>,
    /// Keyword argument, for keyword searches.
    pub keyword: Option<String>,
}

impl RecordedCall {
    fn new(operation: Operation, options: &SearchOptions, keyword: Option<&str>) -> Self {
        Self {
            operation,
            radius_m: options.radius_m,
            min_distance_m: options.min_distance_m,
            exclude_ids: options.exclude_ids.clone(),
            keyword: keyword.map(str::to_owned),
        }
    }

    fn bounds() -> Self {
        Self {
            operation: Operation::SearchByBounds,
            radius_m: None,
            min_distance_m: None,
            exclude_ids: BTreeSet::new(),
            keyword: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CallLog(Arc<Mutex<Vec<RecordedCall>>>);

impl CallLog {
    fn push(&self, call: RecordedCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    fn snapshot(&self) -> Vec<RecordedCall> {
        self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum Script {
    Nothing,
    Fail,
    Hang,
    Return(Vec<Place>),
    FromRadius { min_radius_m: u32, places: Vec<Place> },
}

/// Provider that replays a fixed script and records every call.
///
/// Scripted places are returned verbatim: the provider applies no filtering,
/// which lets tests check that callers reject results that ignore the
/// exclusion set or distance band.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: CallLog,
}

impl ScriptedProvider {
    fn scripted(name: &str, script: Script) -> Self {
        Self {
            name: name.to_owned(),
            script,
            calls: CallLog::default(),
        }
    }

    /// Always answers empty.
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self::scripted(name, Script::Nothing)
    }

    /// Always fails with a network error.
    #[must_use]
    pub fn failing(name: &str) -> Self {
        Self::scripted(name, Script::Fail)
    }

    /// Never completes.
    #[must_use]
    pub fn hanging(name: &str) -> Self {
        Self::scripted(name, Script::Hang)
    }

    /// Always answers with `places`; single-result operations return the
    /// first.
    #[must_use]
    pub fn returning(name: &str, places: Vec<Place>) -> Self {
        Self::scripted(name, Script::Return(places))
    }

    /// Answers with `places` once the requested radius reaches
    /// `min_radius_m`, and empty below it.
    #[must_use]
    pub fn from_radius(name: &str, min_radius_m: u32, places: Vec<Place>) -> Self {
        Self::scripted(
            name,
            Script::FromRadius {
                min_radius_m,
                places,
            },
        )
    }

    /// Every call observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.snapshot()
    }

    /// Radii of the radius-based calls observed so far.
    #[must_use]
    pub fn radii(&self) -> Vec<u32> {
        self.calls().into_iter().filter_map(|call| call.radius_m).collect()
    }

    async fn answer(&self, radius_m: Option<u32>) -> Result<Vec<Place>, ProviderError> {
        match &self.script {
            Script::Nothing => Ok(Vec::new()),
            Script::Fail => Err(ProviderError::Network {
                url: format!("stub://{}", self.name),
                message: "connection refused".to_owned(),
            }),
            Script::Hang => std::future::pending().await,
            Script::Return(places) => Ok(places.clone()),
            Script::FromRadius {
                min_radius_m,
                places,
            } => Ok(if radius_m.is_some_and(|radius| radius >= *min_radius_m) {
                places.clone()
            } else {
                Vec::new()
            }),
        }
    }
}

#[async_trait]
impl PlaceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_places(
        &self,
        _origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        self.calls
            .push(RecordedCall::new(Operation::SearchPlaces, options, None));
        self.answer(options.radius_m).await
    }

    async fn find_random_place(
        &self,
        _origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.calls
            .push(RecordedCall::new(Operation::FindRandomPlace, options, None));
        let places = self.answer(options.radius_m).await?;
        Ok(places.into_iter().next())
    }

    async fn search_by_keyword(
        &self,
        _origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.calls.push(RecordedCall::new(
            Operation::SearchByKeyword,
            options,
            Some(keyword),
        ));
        let places = self.answer(options.radius_m).await?;
        Ok(places.into_iter().next())
    }

    async fn search_by_bounds(
        &self,
        _bounds: Bounds,
        _limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        self.calls.push(RecordedCall::bounds());
        self.answer(None).await
    }
}

/// Real filtering over a small in-memory dataset, with call recording.
#[derive(Debug, Clone)]
pub struct MemoryPlaceProvider {
    name: String,
    index: Arc<PlaceIndex>,
    calls: CallLog,
}

impl MemoryPlaceProvider {
    /// Serve `records` with their venue kinds given explicitly.
    pub fn new<I>(name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = (Place, VenueKind)>,
    {
        Self {
            name: name.to_owned(),
            index: Arc::new(PlaceIndex::new(records)),
            calls: CallLog::default(),
        }
    }

    /// Serve `places`, classifying each from its name and category.
    pub fn classify<I>(name: &str, places: I) -> Self
    where
        I: IntoIterator<Item = Place>,
    {
        Self {
            name: name.to_owned(),
            index: Arc::new(PlaceIndex::classify(places)),
            calls: CallLog::default(),
        }
    }

    /// Every call observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.snapshot()
    }

    /// Radii of the radius-based calls observed so far.
    #[must_use]
    pub fn radii(&self) -> Vec<u32> {
        self.calls().into_iter().filter_map(|call| call.radius_m).collect()
    }
}

#[async_trait]
impl PlaceProvider for MemoryPlaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        self.calls
            .push(RecordedCall::new(Operation::SearchPlaces, options, None));
        self.index.search_places(origin, options).await
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.calls
            .push(RecordedCall::new(Operation::FindRandomPlace, options, None));
        self.index.find_random_place(origin, options).await
    }

    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.calls.push(RecordedCall::new(
            Operation::SearchByKeyword,
            options,
            Some(keyword),
        ));
        self.index.search_by_keyword(origin, keyword, options).await
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        self.calls.push(RecordedCall::bounds());
        self.index.search_by_bounds(bounds, limit).await
    }
}

/// Reverse geocoder returning a canned answer.
#[derive(Debug, Clone)]
pub struct StubReverseGeocoder {
    answer: Result<AddressParts, GeocodeError>,
}

impl StubReverseGeocoder {
    /// Always answer with `parts`.
    #[must_use]
    pub const fn answering(parts: AddressParts) -> Self {
        Self { answer: Ok(parts) }
    }

    /// Always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            answer: Err(GeocodeError::Unavailable {
                url: "stub://geocoder".to_owned(),
                message: "service unavailable".to_owned(),
            }),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for StubReverseGeocoder {
    async fn reverse(&self, _location: Location) -> Result<AddressParts, GeocodeError> {
        self.answer.clone()
    }
}

/// Write `places` into a fresh `places` table at `path`.
///
/// # Errors
///
/// Returns any error raised by SQLite.
#[cfg(feature = "store-sqlite")]
pub fn write_places_database(
    path: &std::path::Path,
    places: &[Place],
) -> Result<(), rusqlite::Error> {
    let mut connection = rusqlite::Connection::open(path)?;
    let tx = connection.transaction()?;
    tx.execute(
        "CREATE TABLE places (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            lat REAL,
            lng REAL,
            address TEXT,
            category TEXT,
            rating REAL,
            review_count INTEGER,
            external_id TEXT
        )",
        [],
    )?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO places (id, name, lat, lng, address, category, rating, review_count, \
             external_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for place in places {
            insert.execute(rusqlite::params![
                place.id,
                place.name,
                place.location.lat(),
                place.location.lng(),
                place.address,
                place.category,
                place.rating,
                place.review_count,
                place.external_ref,
            ])?;
        }
    }
    tx.commit()
}
