//! SQLite-backed provider for a local place database.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::{info, warn};
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use crate::{Bounds, Location, Place, PlaceProvider, ProviderError, SearchOptions, emoji_for};

use super::PlaceIndex;

const SELECT_PLACES: &str = "SELECT id, name, lat, lng, address, category, rating, \
     review_count, external_id FROM places";

/// Error raised when opening or reading a place database.
#[derive(Debug, Error)]
pub enum SqlitePlaceStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Reading the `places` table failed.
    #[error("failed to read places from {path}: {source}")]
    Query {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Read-only provider over the `places` table of a SQLite database.
///
/// Rows are loaded once into a [`PlaceIndex`]; queries never touch the
/// database afterwards.
pub struct SqlitePlaceStore {
    path: PathBuf,
    index: PlaceIndex,
}

impl fmt::Debug for SqlitePlaceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlitePlaceStore")
            .field("path", &self.path)
            .field("entries", &self.index.len())
            .finish_non_exhaustive()
    }
}

struct PlaceRow {
    id: String,
    name: String,
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
    category: Option<String>,
    rating: Option<f64>,
    review_count: Option<i64>,
    external_id: Option<String>,
}

impl PlaceRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            lat: row.get(2)?,
            lng: row.get(3)?,
            address: row.get(4)?,
            category: row.get(5)?,
            rating: row.get(6)?,
            review_count: row.get(7)?,
            external_id: row.get(8)?,
        })
    }

    fn into_place(self) -> Option<Place> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return None;
        };
        let location = match Location::new(lat, lng) {
            Ok(location) => location,
            Err(err) => {
                warn!("skipping place {}: {err}", self.id);
                return None;
            }
        };
        let emoji = emoji_for(self.category.as_deref(), None);
        let review_count = self.review_count.and_then(|count| u32::try_from(count).ok());
        let mut place = Place::new(self.id, location, self.name)
            .with_emoji(emoji)
            .with_rating(self.rating, review_count);
        place.address = self.address.filter(|text| !text.trim().is_empty());
        place.category = self.category;
        place.external_ref = self.external_id;
        Some(place)
    }
}

impl SqlitePlaceStore {
    /// Open the database at `path` and index every row with coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePlaceStoreError`] when the file cannot be opened or
    /// the `places` table cannot be read.
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self, SqlitePlaceStoreError> {
        let path = database_path.as_ref().to_path_buf();
        let connection = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqlitePlaceStoreError::OpenDatabase {
                path: path.clone(),
                source,
            })?;
        let places = load_places(&connection).map_err(|source| SqlitePlaceStoreError::Query {
            path: path.clone(),
            source,
        })?;
        info!("loaded {} places from {}", places.len(), path.display());
        Ok(Self {
            path,
            index: PlaceIndex::classify(places),
        })
    }

    /// Number of indexed places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the database held no usable rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn load_places(connection: &Connection) -> rusqlite::Result<Vec<Place>> {
    let mut statement = connection.prepare(SELECT_PLACES)?;
    let rows = statement.query_map([], PlaceRow::read)?;
    let mut places = Vec::new();
    for row in rows {
        if let Some(place) = row?.into_place() {
            places.push(place);
        }
    }
    Ok(places)
}

#[async_trait]
impl PlaceProvider for SqlitePlaceStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn search_places(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, ProviderError> {
        self.index.search_places(origin, options).await
    }

    async fn find_random_place(
        &self,
        origin: Location,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.index.find_random_place(origin, options).await
    }

    async fn search_by_keyword(
        &self,
        origin: Location,
        keyword: &str,
        options: &SearchOptions,
    ) -> Result<Option<Place>, ProviderError> {
        self.index.search_by_keyword(origin, keyword, options).await
    }

    async fn search_by_bounds(
        &self,
        bounds: Bounds,
        limit: usize,
    ) -> Result<Vec<Place>, ProviderError> {
        self.index.search_by_bounds(bounds, limit).await
    }
}
