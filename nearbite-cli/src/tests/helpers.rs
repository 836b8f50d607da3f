//! Test helpers for building throwaway workspaces and stub provider chains.

use std::{fs, sync::Arc};

use camino::{Utf8Path, Utf8PathBuf};
use nearbite_core::{Location, Place, ProviderChain, test_support::MemoryPlaceProvider};
use tempfile::TempDir;

use crate::{
    CliError,
    providers::{ChainBuilder, ChainSettings},
};

/// District 3, Ho Chi Minh City.
pub(super) const ORIGIN: (f64, f64) = (10.7769, 106.6909);

pub(super) fn origin() -> Location {
    Location::new(ORIGIN.0, ORIGIN.1).expect("valid origin")
}

pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

/// Serves a fixed set of places through a one-link chain.
#[derive(Debug, Clone, Default)]
pub(super) struct StubChainBuilder {
    pub(super) places: Vec<Place>,
}

impl ChainBuilder for StubChainBuilder {
    fn build(&self, _settings: &ChainSettings) -> Result<ProviderChain, CliError> {
        let provider = MemoryPlaceProvider::classify("stub", self.places.clone());
        Ok(ProviderChain::new(Vec::new()).then(Arc::new(provider)))
    }
}
