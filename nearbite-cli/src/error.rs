//! Error types emitted by the Nearbite CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use nearbite_core::{ParseFilterError, ParseProviderKindError, ParseTierError, SearchError};
use nearbite_data::{ChainBuildError, PersistPlacesError};
use thiserror::Error;

/// Errors emitted by the Nearbite CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the offending option.
        field: &'static str,
        /// Environment variable that can supply the option.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the offending option.
        field: &'static str,
        /// Path that was involved.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the offending option.
        field: &'static str,
        /// Path that was involved.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the offending option.
        field: &'static str,
        /// Path that was involved.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The venue filter was not `all`, `food` or `drink`.
    #[error(transparent)]
    InvalidFilter(#[from] ParseFilterError),
    /// The distance tier was not `near` or `far`.
    #[error(transparent)]
    InvalidTier(#[from] ParseTierError),
    /// The provider order named an unknown provider.
    #[error(transparent)]
    InvalidProviderOrder(#[from] ParseProviderKindError),
    /// The per-provider timeout was zero.
    #[error("provider timeout must be at least one second")]
    ZeroTimeout,
    /// The search inputs were rejected before any provider was called.
    #[error(transparent)]
    InvalidInput(#[from] SearchError),
    /// Assembling the provider chain failed.
    #[error("failed to build provider chain: {0}")]
    BuildChain(#[from] ChainBuildError),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    StartRuntime(#[source] std::io::Error),
    /// Saving browsed places to SQLite failed.
    #[error("failed to save places to {path:?}: {source}")]
    PersistPlaces {
        /// Path that was involved.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: PersistPlacesError,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
