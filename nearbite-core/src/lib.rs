//! Core of the Nearbite place discovery engine.
//!
//! The crate defines the validated request types ([`Location`], [`Bounds`],
//! [`SearchOptions`]), the [`PlaceProvider`] contract each data source
//! implements, the [`ProviderChain`] that falls back across sources, and the
//! [`ProgressiveSearch`] controller that widens the search radius until a
//! venue turns up.
//!
//! # Examples
//!
//! ```
//! use nearbite_core::{DiscoveryRequest, Location, Place, PlaceIndex, ProgressiveSearch};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let origin = Location::new(10.77, 106.70).unwrap();
//! let nearby = Location::new(10.781, 106.70).unwrap();
//! let index = PlaceIndex::classify([Place::new("1", nearby, "Cơm Tấm Cali")]);
//!
//! let search = ProgressiveSearch::new(index);
//! let discovery = search.random(&DiscoveryRequest::from_location(origin)).await;
//! assert_eq!(discovery.radius_m, Some(1_500));
//! # });
//! ```
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod address;
mod candidate;
mod chain;
mod options;
mod place;
mod provider;
mod search;
mod spatial;
mod store;
pub mod text;
mod tier;
mod venue;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use address::{AddressParts, GeocodeError, ReverseGeocoder, address_from_tags, enrich_address};
pub use candidate::{CandidateFilter, pick_random};
pub use chain::{
    ChainConfig, DEFAULT_PROVIDER_TIMEOUT, ParseProviderKindError, ProviderChain, ProviderKind,
};
pub use options::SearchOptions;
pub use place::{Place, Tags};
pub use provider::{Operation, PlaceProvider, ProviderError};
pub use search::{DEFAULT_BOUNDS_LIMIT, Discovery, DiscoveryRequest, ProgressiveSearch, SearchError};
pub use spatial::{Bounds, BoundsError, Location, LocationError};
pub use store::{DEFAULT_INDEX_RADIUS_M, PlaceIndex, SEARCH_LIMIT};
#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub use store::{SqlitePlaceStore, SqlitePlaceStoreError};
pub use tier::{DistanceTier, FAR_LADDER_M, NEAR_LADDER_M, ParseTierError, TIER_BOUNDARY_M};
pub use venue::{
    ALL_AMENITIES, DRINK_AMENITIES, FOOD_AMENITIES, ParseFilterError, VenueFilter, VenueKind,
    emoji_for,
};
