//! Behavioural tests for `SqlitePlaceStore` using rstest-bdd.
#![cfg(feature = "store-sqlite")]

use std::{cell::RefCell, future::Future, path::PathBuf};

use nearbite_core::{
    Location, Place, PlaceProvider, SearchOptions, SqlitePlaceStore, SqlitePlaceStoreError,
    test_support::{place_north_of, write_places_database},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// Shared state for SQLite store scenarios.
#[derive(Debug)]
struct StoreWorld {
    temp_dir: TempDir,
    store: RefCell<Option<SqlitePlaceStore>>,
    error: RefCell<Option<SqlitePlaceStoreError>>,
    found: RefCell<Option<Place>>,
}

impl StoreWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            store: RefCell::new(None),
            error: RefCell::new(None),
            found: RefCell::new(None),
        }
    }

    fn database_path(&self) -> PathBuf {
        self.temp_dir.path().join("places.db")
    }
}

#[fixture]
fn world() -> StoreWorld {
    StoreWorld::new()
}

fn origin() -> Location {
    Location::new(21.03, 105.85).expect("valid origin")
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
        .block_on(future)
}

#[given("a place database with two venues in Hanoi")]
fn given_database(world: &StoreWorld) {
    let places = vec![
        place_north_of(origin(), "bun-cha", "Bún Chả Hương Liên", 600.0)
            .with_category("vietnamese")
            .with_rating(Some(4.6), Some(1_820)),
        place_north_of(origin(), "cafe", "Cà Phê Giảng", 1_100.0).with_category("cafe"),
    ];
    write_places_database(&world.database_path(), &places).expect("write database");
}

#[given("a row without coordinates")]
fn given_row_without_coordinates(world: &StoreWorld) {
    let connection = rusqlite::Connection::open(world.database_path()).expect("open database");
    connection
        .execute(
            "INSERT INTO places (id, name) VALUES ('ghost', 'Quán Ma')",
            [],
        )
        .expect("insert row");
}

#[given("no place database")]
fn given_no_database(world: &StoreWorld) {
    assert!(!world.database_path().exists());
}

#[when("I open the SQLite place store")]
fn open_store(world: &StoreWorld) {
    match SqlitePlaceStore::open(world.database_path()) {
        Ok(store) => {
            world.store.replace(Some(store));
        }
        Err(err) => {
            world.error.replace(Some(err));
        }
    }
}

#[when("I search the store for \"bun cha\"")]
fn search_store(world: &StoreWorld) {
    let store = world.store.borrow();
    let store = store.as_ref().expect("store should be open");
    let found = block_on(store.search_by_keyword(origin(), "bun cha", &SearchOptions::default()))
        .expect("search should succeed");
    world.found.replace(found);
}

#[then("the Bún Chả venue is returned with its distance")]
fn then_bun_cha(world: &StoreWorld) {
    let found = world.found.borrow();
    let place = found.as_ref().expect("a venue should be found");
    assert_eq!(place.id, "bun-cha");
    assert_eq!(place.review_count, Some(1_820));
    let km = place.distance_km.expect("distance should be set");
    assert!((km - 0.6).abs() < 0.01, "distance was {km}");
}

#[then("the store holds two venues")]
fn then_two_venues(world: &StoreWorld) {
    let store = world.store.borrow();
    let store = store.as_ref().expect("store should be open");
    assert_eq!(store.len(), 2);
}

#[then("opening fails with an open database error")]
fn then_open_error(world: &StoreWorld) {
    let error = world.error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(SqlitePlaceStoreError::OpenDatabase { .. })
    ));
}

#[scenario(path = "tests/features/sqlite_place_store.feature", index = 0)]
fn keyword_search_ignores_accents(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_place_store.feature", index = 1)]
fn rows_without_coordinates_are_ignored(world: StoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_place_store.feature", index = 2)]
fn missing_database_is_reported(world: StoreWorld) {
    let _ = world;
}
