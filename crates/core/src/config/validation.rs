//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::cache::{DEFAULT_MAX_VALUE_BYTES, DEFAULT_TTL};
use crate::config::AppConfig;
use thiserror::Error;

/// Upper bound on `max_pages`.
pub const PAGE_CAP: u32 = 10_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `user_agent` is empty
    /// - `timeout_ms` is below 100ms or above 5 minutes
    /// - `max_bytes` is 0
    /// - `chunk_size` is 0 or above the backend value ceiling
    /// - `cache_ttl_secs` is 0 or above 6 hours
    /// - `max_pages` is 0 or above 10,000
    /// - either URL is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }

        if self.chunk_size == 0 || self.chunk_size > DEFAULT_MAX_VALUE_BYTES {
            return Err(invalid("chunk_size", "must be between 1 and 100000"));
        }

        if self.cache_ttl_secs == 0 || self.cache_ttl_secs > DEFAULT_TTL.as_secs() {
            return Err(invalid("cache_ttl_secs", "must be between 1 and 21600"));
        }

        if self.max_pages == 0 || self.max_pages > PAGE_CAP {
            return Err(invalid("max_pages", "must be between 1 and 10000"));
        }

        if self.esi_base_url.trim().is_empty() {
            return Err(invalid("esi_base_url", "must not be empty"));
        }
        if self.sde_tables_url.trim().is_empty() {
            return Err(invalid("sde_tables_url", "must not be empty"));
        }

        if self.jitter_max_ms > self.timeout_ms {
            tracing::warn!(
                jitter_max_ms = self.jitter_max_ms,
                timeout_ms = self.timeout_ms,
                "jitter delay may exceed the request timeout"
            );
        }

        Ok(())
    }
}
