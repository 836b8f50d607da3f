//! Test utilities for the network-backed providers.
//!
//! [`StubTransport`] answers requests from canned bodies so provider
//! behaviour can be exercised without a network.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nearbite_core::ProviderError;
use url::Url;

use crate::transport::Transport;

/// Canned [`Transport`] that records every request.
///
/// Routes are matched in insertion order against the request path followed
/// by its percent-decoded query, so a fragment such as `"around:500,"` finds
/// an Overpass query. Unmatched requests fail with HTTP 404.
///
/// # Example
///
/// ```
/// use nearbite_data::test_support::StubTransport;
///
/// let transport = StubTransport::new().respond("/Place/Detail", r#"{"status":"OK"}"#);
/// assert!(transport.requests().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    routes: Vec<(String, Result<String, ProviderError>)>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubTransport {
    /// A transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests containing `fragment` with `body`.
    #[must_use]
    pub fn respond(mut self, fragment: &str, body: &str) -> Self {
        self.routes.push((fragment.to_owned(), Ok(body.to_owned())));
        self
    }

    /// Fail requests containing `fragment` with `error`.
    #[must_use]
    pub fn fail(mut self, fragment: &str, error: ProviderError) -> Self {
        self.routes.push((fragment.to_owned(), Err(error)));
        self
    }

    /// Decoded form of every request made so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

/// Render the path and decoded query of `url` for matching.
fn decoded(url: &Url) -> String {
    let query: Vec<String> = url
        .query_pairs()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("{}?{}", url.path(), query.join("&"))
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_text(&self, url: &Url) -> Result<String, ProviderError> {
        let request = decoded(url);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.routes
            .iter()
            .find(|(fragment, _)| request.contains(fragment.as_str()))
            .map_or_else(
                || {
                    Err(ProviderError::Http {
                        url: url.path().to_owned(),
                        status: 404,
                        message: "no stubbed response".to_owned(),
                    })
                },
                |(_, outcome)| outcome.clone(),
            )
    }
}
