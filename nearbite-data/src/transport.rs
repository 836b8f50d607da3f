//! Shared HTTP plumbing for the network-backed providers.
//!
//! Providers never talk to `reqwest` directly. They build a [`Url`] and hand
//! it to a [`Transport`], which returns the response body or a
//! [`ProviderError`]. Production code uses [`HttpTransport`]; tests swap in
//! a canned transport so no request leaves the process.

use std::time::Duration;

use async_trait::async_trait;
use nearbite_core::ProviderError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "nearbite/0.1";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error raised while constructing a network-backed provider.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL does not parse.
    #[error("invalid base URL {url:?}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// Fetch a URL and return its body as text.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the request fails, times out or the
    /// service answers with a non-success status.
    async fn get_text(&self, url: &Url) -> Result<String, ProviderError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a client sending `user_agent` and giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError::HttpClient`] when the TLS backend or
    /// client configuration cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, timeout })
    }

    fn convert_reqwest_error(&self, error: reqwest::Error, url: &Url) -> ProviderError {
        if error.is_timeout() {
            return ProviderError::Timeout {
                target: redacted(url),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        if let Some(status) = error.status() {
            return ProviderError::Http {
                url: redacted(url),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        ProviderError::Network {
            url: redacted(url),
            message: error.without_url().to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &Url) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, url))?;
        response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(err, url))
    }
}

/// Fetch `url` and decode its body as JSON.
pub(crate) async fn fetch_json<T>(transport: &dyn Transport, url: &Url) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
{
    let body = transport.get_text(url).await?;
    serde_json::from_str(&body).map_err(|err| ProviderError::Parse {
        origin: redacted(url),
        message: err.to_string(),
    })
}

/// Resolve `path` below a configured base URL.
///
/// An empty `path` names the base itself.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, ProviderBuildError> {
    let base = base_url.trim_end_matches('/');
    let raw = if path.is_empty() {
        base.to_owned()
    } else {
        format!("{base}/{path}")
    };
    Url::parse(&raw).map_err(|source| ProviderBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source,
    })
}

/// Render `url` without its query string so API keys stay out of logs.
pub(crate) fn redacted(url: &Url) -> String {
    let mut bare = url.clone();
    bare.set_query(None);
    bare.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn http_transport_builds_with_defaults() {
        let transport = HttpTransport::new(DEFAULT_USER_AGENT, Duration::from_secs(1));
        assert!(transport.is_ok());
    }

    #[rstest]
    #[case("https://rsapi.goong.io/Place/", "Detail", "https://rsapi.goong.io/Place/Detail")]
    #[case("https://rsapi.goong.io/Place", "AutoComplete", "https://rsapi.goong.io/Place/AutoComplete")]
    #[case("https://overpass.test/api/interpreter", "", "https://overpass.test/api/interpreter")]
    fn endpoint_joins_paths(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let url = endpoint(base, path).expect("endpoint should parse");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn endpoint_rejects_garbage() {
        let err = endpoint("not a url", "Detail").expect_err("garbage should fail");
        assert!(matches!(err, ProviderBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_requests_keep_api_keys_out_of_messages() {
        let transport =
            HttpTransport::new(DEFAULT_USER_AGENT, Duration::from_secs(2)).expect("transport");
        let url = Url::parse("http://127.0.0.1:1/Place/AutoComplete?api_key=SECRETKEY&input=pho")
            .expect("url");

        let err = transport
            .get_text(&url)
            .await
            .expect_err("nothing listens on port 1");

        let rendered = err.to_string();
        assert!(!rendered.contains("SECRETKEY"), "key leaked: {rendered}");
        assert!(rendered.contains("/Place/AutoComplete"), "{rendered}");
    }

    #[rstest]
    fn redacted_strips_query() {
        let url = Url::parse("https://example.test/Place/Detail?api_key=secret&place_id=1")
            .expect("url");
        assert_eq!(redacted(&url), "https://example.test/Place/Detail");
    }
}
