//! Network-backed data sources and persistence for the nearbite engine.
//!
//! Responsibilities:
//! - Implement [`nearbite_core::PlaceProvider`] over the Goong Place API and
//!   the Overpass OpenStreetMap interpreter.
//! - Implement [`nearbite_core::ReverseGeocoder`] over BigDataCloud.
//! - Persist venues into the SQLite layout read by
//!   [`nearbite_core::SqlitePlaceStore`].
//! - Assemble a [`nearbite_core::ProviderChain`] from configuration.
//!
//! Boundaries:
//! - Do not encode discovery rules (they live in `nearbite-core`).
//! - Keep blocking I/O off async executors; HTTP goes through `reqwest`.
//!
//! Invariants:
//! - Providers are `Send + Sync` and hold no mutable state.
//! - API keys never appear in logs or error messages.

mod assemble;
pub mod geocode;
pub mod goong;
pub mod overpass;
mod persist;
mod transport;

#[doc(hidden)]
pub mod test_support;

pub use assemble::{ChainBuildError, ProviderSettings, build_chain};
pub use persist::{PersistPlacesError, persist_places_to_sqlite};
pub use transport::{DEFAULT_USER_AGENT, HttpTransport, ProviderBuildError, Transport};
