//! Unified error types for esicache.
//!
//! Every variant renders with a stable uppercase code prefix so log lines and
//! CLI output can be grepped by failure kind.

use tokio_rusqlite::rusqlite;

use crate::request::FetchOptions;

/// Unified error type shared by the core and client crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty id list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be canonicalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Upstream answered with a status the caller does not accept.
    #[error("HTTP_ERROR: {url} ({options}) returned status {status}")]
    HttpStatus { url: String, options: FetchOptions, status: u16 },

    /// Transport-level failure (connect, TLS, read).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Response body could not be interpreted.
    #[error("MALFORMED_RESPONSE: {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    /// Response body larger than the configured limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Page count header exceeded the configured page cap.
    #[error("PAGE_LIMIT_EXCEEDED: {url} reports {pages} pages (limit {limit})")]
    PageLimitExceeded { url: String, pages: u64, limit: u32 },

    /// Cache backend refused a write.
    #[error("CACHE_WRITE_FAILED: {0}")]
    CacheWrite(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Named reference table is missing from the table index.
    #[error("UNKNOWN_TABLE: {0}")]
    UnknownTable(String),

    /// No reference record for the given id.
    #[error("UNKNOWN_REFERENCE: {table} has no entry for {id}")]
    UnknownReference { table: &'static str, id: i64 },
}

impl Error {
    /// Build a `MalformedResponse` from any displayable cause.
    pub fn malformed(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::MalformedResponse { url: url.into(), reason: reason.to_string() }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = Error::HttpStatus {
            url: "https://esi.evetech.net/latest/markets/10000002/orders/?page=2".to_string(),
            options: FetchOptions::get(),
            status: 500,
        };
        let shown = err.to_string();
        assert!(shown.starts_with("HTTP_ERROR"));
        assert!(shown.contains("page=2"));
        assert!(shown.contains("500"));
    }

    #[test]
    fn test_unknown_reference_display() {
        let err = Error::UnknownReference { table: "invTypes", id: 34 };
        assert_eq!(err.to_string(), "UNKNOWN_REFERENCE: invTypes has no entry for 34");
    }

    #[test]
    fn test_malformed_helper() {
        let err = Error::malformed("https://example.com/", "expected a JSON array");
        assert!(matches!(err, Error::MalformedResponse { ref url, .. } if url == "https://example.com/"));
    }
}
