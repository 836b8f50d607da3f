//! The capability contract every place data source implements.
//!
//! A [`PlaceProvider`] answers four questions about venues near a
//! [`Location`](crate::Location): list candidates, pick one at random, pick
//! one matching a keyword, and list everything inside a rectangle. Database,
//! commercial API and OpenStreetMap sources implement it directly; the
//! [`ProviderChain`](crate::ProviderChain) implements it by delegation.
//!
//! Failures are reported as [`ProviderError`]. Providers must never return a
//! place that violates the request's exclusion set or distance band.

mod contract;
mod error;

pub use contract::{Operation, PlaceProvider};
pub use error::ProviderError;
