//! Static Data Export loader.
//!
//! Downloads the table index, then the inventory and industry tables it names.
//! The index always goes through the cache. Tables are fetched directly unless
//! caching is enabled with [`SdeLoader::with_cache`]; several of them run to
//! megabytes and would otherwise fill hundreds of chunks. The result is an
//! immutable [`ReferenceIndex`].

use serde::de::DeserializeOwned;

use crate::fetch::CachedFetcher;
use esicache_core::reference::tables::{
    ActivityMaterialRecord, ActivityProbabilityRecord, ActivityProductRecord, ActivitySkillRecord, ActivityTimeRecord,
    CategoryRecord, GroupRecord, MarketGroupRecord, ReferenceTables, TableLink, TypeRecord, industry_activities,
};
use esicache_core::reference::{
    ACTIVITY_MATERIALS_TABLE, ACTIVITY_PROBABILITIES_TABLE, ACTIVITY_PRODUCTS_TABLE, ACTIVITY_SKILLS_TABLE,
    ACTIVITY_TIMES_TABLE, CATEGORIES_TABLE, GROUPS_TABLE, MARKET_GROUPS_TABLE, TYPES_TABLE,
};
use esicache_core::{CacheScope, Error, FetchOptions, ReferenceIndex};

/// Loads reference tables from an SDE mirror.
#[derive(Clone)]
pub struct SdeLoader {
    fetcher: CachedFetcher,
    tables_url: String,
    scope: CacheScope,
    use_cache: bool,
}

impl SdeLoader {
    pub fn new(fetcher: CachedFetcher, tables_url: impl Into<String>) -> Self {
        Self { fetcher, tables_url: tables_url.into(), scope: CacheScope::Document, use_cache: false }
    }

    /// Cache namespace used for downloads (default: document).
    pub fn with_scope(mut self, scope: CacheScope) -> Self {
        self.scope = scope;
        self
    }

    /// Route table downloads through the cache as well (default: direct).
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// The table index: one `{name, href}` entry per available table.
    pub async fn table_index(&self) -> Result<Vec<TableLink>, Error> {
        self.fetcher.fetch_json(&self.tables_url, &FetchOptions::get(), self.scope).await
    }

    /// Download the table called `name` and parse its rows.
    ///
    /// # Errors
    ///
    /// `UnknownTable` if `name` is not in `index`; fetch errors otherwise.
    pub async fn load_table<T: DeserializeOwned>(&self, index: &[TableLink], name: &str) -> Result<Vec<T>, Error> {
        let link = index
            .iter()
            .find(|link| link.name == name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))?;

        let options = FetchOptions::get();
        let rows: Vec<T> = if self.use_cache {
            self.fetcher.fetch_json(&link.href, &options, self.scope).await?
        } else {
            self.fetcher.fetch_direct_json(&link.href, &options).await?
        };
        tracing::debug!(table = name, rows = rows.len(), cached = self.use_cache, "loaded reference table");
        Ok(rows)
    }

    /// Download every inventory and industry table and build the lookup index.
    pub async fn load_index(&self) -> Result<ReferenceIndex, Error> {
        let index = self.table_index().await?;

        let (types, groups, categories, market_groups) = tokio::try_join!(
            self.load_table::<TypeRecord>(&index, TYPES_TABLE),
            self.load_table::<GroupRecord>(&index, GROUPS_TABLE),
            self.load_table::<CategoryRecord>(&index, CATEGORIES_TABLE),
            self.load_table::<MarketGroupRecord>(&index, MARKET_GROUPS_TABLE),
        )?;

        let (activity_times, activity_materials, activity_products, activity_probabilities, activity_skills) =
            tokio::try_join!(
                self.load_table::<ActivityTimeRecord>(&index, ACTIVITY_TIMES_TABLE),
                self.load_table::<ActivityMaterialRecord>(&index, ACTIVITY_MATERIALS_TABLE),
                self.load_table::<ActivityProductRecord>(&index, ACTIVITY_PRODUCTS_TABLE),
                self.load_table::<ActivityProbabilityRecord>(&index, ACTIVITY_PROBABILITIES_TABLE),
                self.load_table::<ActivitySkillRecord>(&index, ACTIVITY_SKILLS_TABLE),
            )?;

        Ok(ReferenceIndex::build(ReferenceTables {
            types,
            groups,
            categories,
            market_groups,
            activities: industry_activities(),
            activity_times,
            activity_materials,
            activity_products,
            activity_probabilities,
            activity_skills,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{ScriptedTransport, response};
    use esicache_core::{ChunkedCache, MemoryCache};
    use std::sync::Arc;
    use std::time::Duration;

    const INDEX_URL: &str = "http://sde.test/tables.json";
    const GROUP_ROWS: &str = r#"[{"groupID":18,"groupName":"Mineral","categoryID":4,"published":1}]"#;

    fn loader(transport: &Arc<ScriptedTransport>) -> SdeLoader {
        let cache = ChunkedCache::new(Arc::new(MemoryCache::default()));
        let fetcher = CachedFetcher::new(transport.clone(), cache).with_jitter(Duration::ZERO);
        SdeLoader::new(fetcher, INDEX_URL)
    }

    fn groups_index() -> Vec<TableLink> {
        vec![TableLink { name: "invGroups".into(), href: "http://sde.test/invGroups.json".into() }]
    }

    fn index_body() -> String {
        serde_json::json!([
            {"name": "invTypes", "href": "http://sde.test/invTypes.json"},
            {"name": "invGroups", "href": "http://sde.test/invGroups.json"},
        ])
        .to_string()
    }

    #[tokio::test]
    async fn test_table_index_is_cached() {
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, &index_body(), None)]));
        let loader = loader(&transport);

        let index = loader.table_index().await.unwrap();
        loader.table_index().await.unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index[0].name, "invTypes");
        assert_eq!(transport.urls(), vec![INDEX_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_load_table_unknown_name() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let index = vec![TableLink { name: "invTypes".into(), href: "http://sde.test/invTypes.json".into() }];

        let result = loader(&transport).load_table::<GroupRecord>(&index, GROUPS_TABLE).await;

        assert!(matches!(result, Err(Error::UnknownTable(name)) if name == "invGroups"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_load_table_direct_by_default() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            response(200, GROUP_ROWS, None),
            response(200, GROUP_ROWS, None),
        ]));
        let loader = loader(&transport);

        let groups: Vec<GroupRecord> = loader.load_table(&groups_index(), GROUPS_TABLE).await.unwrap();
        let again: Vec<GroupRecord> = loader.load_table(&groups_index(), GROUPS_TABLE).await.unwrap();

        assert_eq!(groups[0].group_name, "Mineral");
        assert_eq!(groups, again);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_table_through_cache() {
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, GROUP_ROWS, None)]));
        let loader = loader(&transport).with_cache(true);

        let groups: Vec<GroupRecord> = loader.load_table(&groups_index(), GROUPS_TABLE).await.unwrap();
        let again: Vec<GroupRecord> = loader.load_table(&groups_index(), GROUPS_TABLE).await.unwrap();

        assert_eq!(groups, again);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_load_index_missing_table_fails() {
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, &index_body(), None)]));

        let result = loader(&transport).load_index().await;

        assert!(matches!(result, Err(Error::UnknownTable(_))));
    }
}
