use thiserror::Error;

/// Errors raised by a single [`crate::PlaceProvider`].
///
/// These describe one data source being unavailable. The
/// [`crate::ProviderChain`] logs and absorbs them; they never reach callers of
/// the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The transport failed before a response arrived.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The call did not finish within its time budget.
    #[error("{target} timed out after {timeout_ms} ms")]
    Timeout {
        /// URL or provider name that timed out.
        target: String,
        /// Budget that was exceeded.
        timeout_ms: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response from {origin}: {message}")]
    Parse {
        /// URL or table the payload came from.
        origin: String,
        /// Decoder error description.
        message: String,
    },
    /// The service reported an application-level failure.
    #[error("{service} reported {code}: {message}")]
    Service {
        /// Service name.
        service: String,
        /// Service status code.
        code: String,
        /// Service message.
        message: String,
    },
    /// A local store could not be queried.
    #[error("storage error: {message}")]
    Storage {
        /// Storage error description.
        message: String,
    },
}
