//! Facade crate for the Nearbite place discovery engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and the network-backed providers behind feature flags.

#![forbid(unsafe_code)]

pub use nearbite_core::{
    Bounds, ChainConfig, Discovery, DiscoveryRequest, DistanceTier, Location, Place,
    PlaceProvider, ProgressiveSearch, ProviderChain, ProviderError, ProviderKind, SearchError,
    SearchOptions, VenueFilter, VenueKind,
};

#[cfg(feature = "store-sqlite")]
pub use nearbite_core::{SqlitePlaceStore, SqlitePlaceStoreError};

#[cfg(feature = "http")]
pub use nearbite_data::{ChainBuildError, ProviderSettings, build_chain};
