//! Error types for the DDNS updater
//!
//! Every failure in the pipeline is fatal to the run. Nothing here is
//! retried or recovered locally; the variants exist so the failing stage
//! can be named in the log line and matched on in tests.

use std::future::Future;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid required input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure: connection refused, timeout, no response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON or lacked the expected shape
    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    /// The WAN IP source answered with something that is not an IPv4 address
    #[error("IP resolution error: {0}")]
    Resolution(String),

    /// The provider returned no zone for the configured zone name
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// The provider returned no A record for a configured host
    #[error("Host record not found: {0}")]
    HostNotFound(String),

    /// The provider stored a different content than the one submitted
    #[error("Update verification failed for {host}: submitted {submitted}, provider stored {stored}")]
    UpdateVerification {
        /// Host name that was updated
        host: String,
        /// IP sent in the update
        submitted: String,
        /// Content echoed back by the provider
        stored: String,
    },

    /// The provider's update response carried no content
    #[error("Malformed update response: {0}")]
    UpdateResponseMalformed(String),

    /// The state file exists but could not be parsed
    #[error("State file is corrupt: {0}")]
    StateCorrupt(String),

    /// The new state could not be written
    #[error("Failed to persist state: {0}")]
    StatePersist(String),

    /// The provider answered with a non-success HTTP status
    #[error("Provider API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error messages, or the raw body excerpt
        message: String,
    },

    /// An underlying failure annotated with the operation that produced it
    #[error("{operation}: {source}")]
    Operation {
        /// Name of the failing operation or stage
        operation: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a response parse error
    pub fn response_parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }

    /// Create an IP resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a state persistence error
    pub fn state_persist(msg: impl Into<String>) -> Self {
        Self::StatePersist(msg.into())
    }

    /// Annotate this error with the name of the operation that failed
    pub fn in_operation(self, operation: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all operation annotations stripped
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Await `fut` and attach `operation` to any failure it produces
///
/// Applied once per remote operation so every error leaving a client
/// names the call that raised it.
pub async fn in_operation<T, F>(operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    fut.await.map_err(|e| e.in_operation(operation))
}

/// Truncate `text` to at most `max` characters for diagnostics
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
