//! Subcommand implementations.
//!
//! Results go to stdout; diagnostics go through tracing on stderr.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use esicache_client::{CachedFetcher, FetchClient, FetchConfig, HttpTransport, PageFetcher, SdeLoader};
use esicache_core::{
    AppConfig, CacheBackend, CacheBackendKind, CacheDb, CacheScope, ChunkedCache, FetchOptions, HttpMethod, MemoryCache,
    ReferenceIndex,
};

use crate::cli::LookupKind;

/// Concrete cache backend selected by configuration.
enum Backend {
    Memory(Arc<MemoryCache>),
    Sqlite(Arc<CacheDb>),
}

impl Backend {
    async fn open(config: &AppConfig) -> Result<Self> {
        match config.cache_backend {
            CacheBackendKind::Memory => Ok(Backend::Memory(Arc::new(MemoryCache::default()))),
            CacheBackendKind::Sqlite => {
                let db = CacheDb::open(&config.db_path)
                    .await
                    .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
                Ok(Backend::Sqlite(Arc::new(db)))
            }
        }
    }

    fn shared(&self) -> Arc<dyn CacheBackend> {
        match self {
            Backend::Memory(cache) => cache.clone(),
            Backend::Sqlite(db) => db.clone(),
        }
    }
}

/// Wired-up fetch stack for one invocation.
pub struct App {
    config: AppConfig,
    backend: Backend,
    transport: Arc<dyn HttpTransport>,
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let backend = Backend::open(&config).await?;
        let transport: Arc<dyn HttpTransport> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
        Ok(Self { config, backend, transport })
    }

    fn cached_fetcher(&self) -> CachedFetcher {
        let cache = ChunkedCache::new(self.backend.shared())
            .with_chunk_size(self.config.chunk_size)
            .with_ttl(self.config.cache_ttl());
        CachedFetcher::new(self.transport.clone(), cache).with_jitter(self.config.jitter_max())
    }

    pub async fn fetch(&self, url: &str, scope: Option<&str>, method: &str, payload: Option<String>) -> Result<String> {
        let Some(method) = HttpMethod::parse(method) else {
            bail!("unsupported method: {method}");
        };
        let scope = scope.map_or(self.config.default_scope, CacheScope::from_selector);

        let options = match payload {
            Some(payload) => FetchOptions::post_json(payload).with_method(method),
            None => FetchOptions::get().with_method(method),
        };

        Ok(self.cached_fetcher().fetch(url, &options, scope).await?)
    }

    pub async fn pages(&self, base_url: &str) -> Result<String> {
        let items = PageFetcher::new(self.transport.clone())
            .with_max_pages(self.config.max_pages)
            .fetch_all_pages(base_url, &FetchOptions::get())
            .await?;
        Ok(serde_json::to_string(&items)?)
    }

    pub async fn lookup(&self, kind: LookupKind, id: i64) -> Result<String> {
        let index = SdeLoader::new(self.cached_fetcher(), &self.config.sde_tables_url)
            .with_cache(self.config.sde_use_cache)
            .load_index()
            .await
            .context("loading reference tables")?;
        Ok(resolve(&index, kind, id)?)
    }

    pub async fn purge(&self) -> Result<usize> {
        let removed = match &self.backend {
            Backend::Memory(cache) => cache.purge_expired().await,
            Backend::Sqlite(db) => db.purge_expired().await?,
        };
        tracing::info!(removed, "purged expired cache entries");
        Ok(removed)
    }
}

fn resolve(index: &ReferenceIndex, kind: LookupKind, id: i64) -> Result<String, esicache_core::Error> {
    Ok(match kind {
        LookupKind::TypeName => index.type_name(id)?.to_string(),
        LookupKind::GroupId => index.group_id(id)?.to_string(),
        LookupKind::GroupName => index.group_name(id)?.to_string(),
        LookupKind::MarketGroupId => index.market_group_id(id)?.to_string(),
        LookupKind::MarketGroupName => index.market_group_name(id)?.to_string(),
        LookupKind::CategoryId => index.category_id(id)?.to_string(),
        LookupKind::CategoryName => index.category_name(id)?.to_string(),
        LookupKind::ActivityName => index.activity_name(id)?.to_string(),
    })
}
