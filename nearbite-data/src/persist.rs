//! SQLite persistence for venues, producing the database read by
//! [`nearbite_core::SqlitePlaceStore`].

use camino::{Utf8Path, Utf8PathBuf};
use nearbite_core::Place;
use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

/// Errors raised when persisting venues to SQLite.
#[derive(Debug, Error)]
pub enum PersistPlacesError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the database whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin place persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `places` table failed.
    #[error("failed to create places table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare place insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a place row failed.
    #[error("failed to persist place {place_id}")]
    PersistRow {
        /// Identifier of the place being persisted.
        place_id: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit place persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Persist venues to a SQLite database on disk.
///
/// The function is idempotent: rows are replaced when identifiers already
/// exist. Parent directories are created automatically and the `places`
/// table is initialised if missing. Distances are not stored; they depend on
/// the origin of each search.
///
/// # Errors
///
/// Returns [`PersistPlacesError`] naming the step that failed.
pub fn persist_places_to_sqlite(
    path: &Utf8Path,
    places: &[Place],
) -> Result<(), PersistPlacesError> {
    nearbite_fs::ensure_parent_dir(path).map_err(|source| {
        PersistPlacesError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistPlacesError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistPlacesError::BeginTransaction { source })?;

    create_schema(&transaction)?;
    persist_rows(&transaction, places)?;

    transaction
        .commit()
        .map_err(|source| PersistPlacesError::Commit { source })?;
    Ok(())
}

fn create_schema(transaction: &Transaction<'_>) -> Result<(), PersistPlacesError> {
    transaction
        .execute(
            "CREATE TABLE IF NOT EXISTS places (
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
        )
        .map(|_| ())
        .map_err(|source| PersistPlacesError::CreateSchema { source })
}

fn persist_rows(transaction: &Transaction<'_>, places: &[Place]) -> Result<(), PersistPlacesError> {
    if places.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO places \
             (id, name, lat, lng, address, category, rating, review_count, external_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|source| PersistPlacesError::PrepareInsert { source })?;

    for place in places {
        statement
            .execute((
                &place.id,
                &place.name,
                place.location.lat(),
                place.location.lng(),
                &place.address,
                &place.category,
                place.rating,
                place.review_count,
                &place.external_ref,
            ))
            .map_err(|source| PersistPlacesError::PersistRow {
                place_id: place.id.clone(),
                source,
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearbite_core::{Location, SqlitePlaceStore};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn place() -> Place {
        let location = Location::new(10.7769, 106.7009).expect("location");
        Place::new("osm-node-7", location, "Bánh Mì Huỳnh Hoa")
            .with_address("26 Lê Thị Riêng")
            .with_category("fast_food")
            .with_rating(Some(4.5), Some(1200))
            .with_external_ref("https://www.openstreetmap.org/node/7")
    }

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn db_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path")
    }

    #[rstest]
    fn persists_places(temp_dir: TempDir, place: Place) {
        let path = db_path(&temp_dir, "places.db");

        persist_places_to_sqlite(&path, std::slice::from_ref(&place)).expect("persist places");

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let stored: (String, String, Option<String>, Option<u32>) = conn
            .query_row(
                "SELECT id, name, category, review_count FROM places",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .expect("read row");
        assert_eq!(stored.0, "osm-node-7");
        assert_eq!(stored.1, "Bánh Mì Huỳnh Hoa");
        assert_eq!(stored.2.as_deref(), Some("fast_food"));
        assert_eq!(stored.3, Some(1200));
    }

    #[rstest]
    fn rewriting_replaces_rows(temp_dir: TempDir, place: Place) {
        let path = db_path(&temp_dir, "places.db");
        persist_places_to_sqlite(&path, std::slice::from_ref(&place)).expect("first write");
        let renamed = Place {
            name: "Huỳnh Hoa".to_owned(),
            ..place
        };
        persist_places_to_sqlite(&path, &[renamed]).expect("second write");

        let conn = Connection::open(path.as_std_path()).expect("open database");
        let (count, name): (i64, String) = conn
            .query_row("SELECT COUNT(*), MAX(name) FROM places", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .expect("count rows");
        assert_eq!(count, 1);
        assert_eq!(name, "Huỳnh Hoa");
    }

    #[rstest]
    fn creates_parent_directory(temp_dir: TempDir, place: Place) {
        let nested = db_path(&temp_dir, "nested/cache/places.db");

        persist_places_to_sqlite(&nested, &[place]).expect("persist into nested path");

        assert!(nested.exists(), "database should be created at nested path");
    }

    #[rstest]
    fn written_database_opens_as_store(temp_dir: TempDir, place: Place) {
        let path = db_path(&temp_dir, "places.db");
        persist_places_to_sqlite(&path, &[place]).expect("persist places");

        let store = SqlitePlaceStore::open(path.as_std_path()).expect("open store");
        assert_eq!(store.len(), 1);
    }
}
