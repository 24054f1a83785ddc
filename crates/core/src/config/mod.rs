//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, highest precedence first:
//!
//! 1. Environment variables (ESICACHE_*)
//! 2. TOML config file (if ESICACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheScope, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_VALUE_BYTES, DEFAULT_TTL};

mod validation;

pub use validation::{ConfigError, PAGE_CAP};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_FILE_ENV: &str = "ESICACHE_CONFIG_FILE";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ESICACHE_";

/// Which cache backend the binary should construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Process-local, lost on exit. Only useful when embedded in a long-lived process.
    Memory,
    /// SQLite file at `db_path`, shared across runs of the binary.
    #[default]
    Sqlite,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for HTTP requests.
    ///
    /// Set via ESICACHE_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via ESICACHE_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum response body size in bytes.
    ///
    /// Set via ESICACHE_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Upper bound (exclusive) of the random delay before an uncached request.
    ///
    /// Set via ESICACHE_JITTER_MAX_MS. Zero disables the delay.
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// Lifetime of cached entry sets in seconds.
    ///
    /// Set via ESICACHE_CACHE_TTL_SECS.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Bytes per cache chunk.
    ///
    /// Set via ESICACHE_CHUNK_SIZE.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Largest page count a paginated fetch will follow.
    ///
    /// Set via ESICACHE_MAX_PAGES.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Namespace used when a caller does not pick one.
    ///
    /// Set via ESICACHE_DEFAULT_SCOPE.
    #[serde(default)]
    pub default_scope: CacheScope,

    /// Cache backend selection.
    ///
    /// Set via ESICACHE_CACHE_BACKEND (`sqlite` or `memory`).
    #[serde(default)]
    pub cache_backend: CacheBackendKind,

    /// Path to the SQLite cache database.
    ///
    /// Set via ESICACHE_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// ESI base URL; endpoint paths are appended to it.
    ///
    /// Set via ESICACHE_ESI_BASE_URL.
    #[serde(default = "default_esi_base_url")]
    pub esi_base_url: String,

    /// Address of the SDE table index.
    ///
    /// Set via ESICACHE_SDE_TABLES_URL.
    #[serde(default = "default_sde_tables_url")]
    pub sde_tables_url: String,

    /// Keep downloaded SDE tables in the cache instead of fetching them on
    /// every lookup. The table index is always cached.
    ///
    /// Set via ESICACHE_SDE_USE_CACHE.
    #[serde(default)]
    pub sde_use_cache: bool,
}

fn default_user_agent() -> String {
    "esicache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_jitter_max_ms() -> u64 {
    5_000
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_pages() -> u32 {
    10_000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./esicache.sqlite")
}

fn default_esi_base_url() -> String {
    "https://esi.evetech.net/latest/".into()
}

fn default_sde_tables_url() -> String {
    "http://sde.zzeve.com/tables.json".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            jitter_max_ms: default_jitter_max_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            chunk_size: default_chunk_size(),
            max_pages: default_max_pages(),
            default_scope: CacheScope::default(),
            cache_backend: CacheBackendKind::default(),
            db_path: default_db_path(),
            esi_base_url: default_esi_base_url(),
            sde_tables_url: default_sde_tables_url(),
            sde_use_cache: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn jitter_max(&self) -> Duration {
        Duration::from_millis(self.jitter_max_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The layered provider stack used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var(CONFIG_FILE_ENV) {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
