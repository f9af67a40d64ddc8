//! Error types for the KoboToolbox client.
//!
//! Every failure the client can surface is a variant of `KoboError`. HTTP
//! related variants carry the status code and raw response body so callers
//! can decide whether a retry makes sense.

use thiserror::Error;

/// Convenience type alias for Results using KoboError.
pub type KoboResult<T> = Result<T, KoboError>;

/// Boxed error produced by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for the client.
#[derive(Error, Debug)]
pub enum KoboError {
    // -- Configuration errors --
    /// Missing or invalid setup, detected before any network access.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested API version has no backend.
    #[error("unsupported api version: {0}")]
    UnsupportedVersion(String),

    // -- HTTP errors --
    /// The server answered 401.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Reason phrase of the response.
        reason: String,
        /// Raw response body, if any.
        body: Option<String>,
    },

    /// Unexpected status code, or a transport failure (status 0).
    #[error("http error (status {status}): {message}")]
    Http {
        /// HTTP status code, `0` when the request never got a response.
        status: u16,
        /// Human-readable description.
        message: String,
        /// Raw response body, if any.
        body: Option<String>,
        /// Underlying transport error when wrapped.
        #[source]
        source: Option<BoxError>,
    },

    /// The server claimed success but the body is not valid JSON.
    #[error("failed to decode response (status {status}): {message}")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// Parser error message.
        message: String,
        /// Raw response body.
        body: String,
    },

    // -- Caller errors --
    /// A date-range filter was requested without any bound.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// XML submission against an asset that has no deployment uuid.
    #[error("asset {0} has no deployment uuid, cannot submit xml")]
    MissingDeploymentUuid(String),

    // -- Ambient --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl KoboError {
    /// Wrap a transport-level failure as an `Http` error with status 0.
    pub fn transport(source: BoxError) -> Self {
        KoboError::Http {
            status: 0,
            message: format!("http client error when sending request: {source}"),
            body: None,
            source: Some(source),
        }
    }

    /// HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            KoboError::Unauthorized { .. } => Some(401),
            KoboError::Http { status, .. } | KoboError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body associated with this error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            KoboError::Unauthorized { body, .. } | KoboError::Http { body, .. } => body.as_deref(),
            KoboError::Decode { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for KoboError {
    fn from(e: serde_json::Error) -> Self {
        KoboError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for KoboError {
    fn from(e: toml::de::Error) -> Self {
        KoboError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = KoboError::Config("missing api key".to_string());
        assert_eq!(err.to_string(), "configuration error: missing api key");
    }

    #[test]
    fn test_unauthorized_status_and_body() {
        let err = KoboError::Unauthorized {
            reason: "Unauthorized".into(),
            body: Some(r#"{"detail":"Invalid token."}"#.into()),
        };
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.response_body(), Some(r#"{"detail":"Invalid token."}"#));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = KoboError::transport(Box::new(io));
        assert_eq!(err.status_code(), Some(0));
        assert!(err.response_body().is_none());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");
    }

    #[test]
    fn test_caller_errors_have_no_status() {
        assert!(KoboError::InvalidFilter("empty".into()).status_code().is_none());
        assert!(KoboError::MissingDeploymentUuid("a1".into()).status_code().is_none());
    }
}
