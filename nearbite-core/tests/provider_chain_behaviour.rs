//! Behavioural tests for `ProviderChain` using rstest-bdd.

use std::{cell::RefCell, collections::BTreeSet, future::Future, sync::Arc, time::Duration};

use nearbite_core::{
    Bounds, Location, Place, ProviderChain, SearchOptions,
    test_support::{MemoryPlaceProvider, ScriptedProvider, place_north_of},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Shared state for chain scenarios.
#[derive(Debug, Default)]
struct ChainWorld {
    chain: RefCell<Option<ProviderChain>>,
    second: RefCell<Option<ScriptedProvider>>,
    expected: RefCell<Option<Place>>,
    random: RefCell<Option<Option<Place>>>,
    bounds_answers: RefCell<Vec<Vec<Place>>>,
}

impl ChainWorld {
    fn chain(&self) -> ProviderChain {
        self.chain.borrow().clone().expect("chain should be built")
    }
}

#[fixture]
fn world() -> ChainWorld {
    ChainWorld::default()
}

fn origin() -> Location {
    Location::new(21.03, 105.85).expect("valid origin")
}

fn cafe() -> Place {
    place_north_of(origin(), "goong-cafe", "Cộng Cà Phê", 400.0).with_category("cafe")
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
        .block_on(future)
}

#[given("a chain whose first provider fails and whose second returns a cafe")]
fn given_failing_then_cafe(world: &ChainWorld) {
    let second = ScriptedProvider::returning("goong", vec![cafe()]);
    let chain = ProviderChain::new(vec![
        Arc::new(ScriptedProvider::failing("sqlite")),
        Arc::new(second.clone()),
    ]);
    world.chain.replace(Some(chain));
    world.second.replace(Some(second));
    world.expected.replace(Some(cafe()));
}

#[given("a chain whose providers all fail")]
fn given_all_failing(world: &ChainWorld) {
    let chain = ProviderChain::new(vec![
        Arc::new(ScriptedProvider::failing("sqlite")),
        Arc::new(ScriptedProvider::failing("goong")),
        Arc::new(ScriptedProvider::failing("overpass")),
    ]);
    world.chain.replace(Some(chain));
}

#[given("a chain whose first provider hangs and whose second returns a cafe")]
fn given_hanging_then_cafe(world: &ChainWorld) {
    let chain = ProviderChain::new(vec![
        Arc::new(ScriptedProvider::hanging("overpass")),
        Arc::new(ScriptedProvider::returning("goong", vec![cafe()])),
    ])
    .with_timeout(Duration::from_millis(50));
    world.chain.replace(Some(chain));
    world.expected.replace(Some(cafe()));
}

#[given("a chain over a database of three venues")]
fn given_database_chain(world: &ChainWorld) {
    let origin = origin();
    let database = MemoryPlaceProvider::classify(
        "database",
        [
            place_north_of(origin, "c", "Bún Chả", 100.0),
            place_north_of(origin, "a", "Phở Thìn", 200.0),
            place_north_of(origin, "b", "Cà Phê Giảng", 300.0),
        ],
    );
    let chain = ProviderChain::new(vec![
        Arc::new(ScriptedProvider::empty("empty")),
        Arc::new(database),
    ]);
    world.chain.replace(Some(chain));
}

#[when("I ask the chain for a random place")]
fn ask_random(world: &ChainWorld) {
    let chain = world.chain();
    let found = block_on(chain.find_random_place(origin(), &SearchOptions::default()));
    world.random.replace(Some(found));
}

#[when("I query the same bounds twice")]
fn query_bounds_twice(world: &ChainWorld) {
    let chain = world.chain();
    let bounds = Bounds::new(21.0, 21.1, 105.8, 105.9).expect("valid bounds");
    let first = block_on(chain.search_by_bounds(bounds, 50));
    let second = block_on(chain.search_by_bounds(bounds, 50));
    world.bounds_answers.replace(vec![first, second]);
}

#[then("the cafe from the second provider is returned unchanged")]
fn then_cafe(world: &ChainWorld) {
    let found = world
        .random
        .borrow()
        .clone()
        .expect("the chain should have been asked");
    assert_eq!(found, world.expected.borrow().clone());
}

#[then("both providers were consulted")]
fn then_both_consulted(world: &ChainWorld) {
    let second = world.second.borrow();
    let second = second.as_ref().expect("second provider recorded");
    assert_eq!(second.calls().len(), 1);
}

#[then("the chain returns nothing")]
fn then_nothing(world: &ChainWorld) {
    let found = world
        .random
        .borrow()
        .clone()
        .expect("the chain should have been asked");
    assert!(found.is_none());
}

#[then("both answers contain the same venues")]
fn then_same_venues(world: &ChainWorld) {
    let answers = world.bounds_answers.borrow();
    let ids: Vec<BTreeSet<String>> = answers
        .iter()
        .map(|places| places.iter().map(|place| place.id.clone()).collect())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids.first(), ids.last());
    assert_eq!(ids.first().map(BTreeSet::len), Some(3));
}

#[scenario(path = "tests/features/provider_chain.feature", index = 0)]
fn failing_provider_falls_through(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/provider_chain.feature", index = 1)]
fn all_failing_answers_empty(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/provider_chain.feature", index = 2)]
fn hanging_provider_times_out(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/provider_chain.feature", index = 3)]
fn bounds_are_repeatable(world: ChainWorld) {
    let _ = world;
}
