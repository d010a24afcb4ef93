//! Backend transport errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors talking to the backend
///
/// Every variant is a transport-level failure from the client's point of
/// view; callers turn them into localized text rather than propagating them
/// to the surface.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, timeout or protocol failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if readable
        body: String,
    },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// Selected file could not be read
    #[error("failed to read {}: {source}", path.display())]
    File {
        /// File that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Status polling gave up after too many attempts
    #[error("document still processing after {0} status checks")]
    PollLimit(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = BackendError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 503: busy");
    }

    #[test]
    fn test_file_display() {
        let err = BackendError::File {
            path: PathBuf::from("/tmp/missing.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to read /tmp/missing.pdf: not found");
    }
}
