//! Typed wrappers for the public ESI endpoints.
//!
//! Every request targets the `tranquility` datasource. List endpoints go
//! through [`PageFetcher`]; slow-moving data goes through [`CachedFetcher`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fetch::{CachedFetcher, HttpTransport, PageFetcher};
use esicache_core::{CacheScope, Error, FetchOptions};

/// Server every request is sent to.
pub const DATASOURCE: &str = "tranquility";

/// Which side of the order book to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
    #[default]
    All,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "buy",
            OrderType::Sell => "sell",
            OrderType::All => "all",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of `/markets/{region_id}/orders/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order_id: i64,
    pub type_id: i64,
    pub location_id: i64,
    #[serde(default)]
    pub system_id: Option<i64>,
    pub is_buy_order: bool,
    pub price: f64,
    pub volume_total: i64,
    pub volume_remain: i64,
    pub min_volume: i64,
    pub duration: i64,
    pub issued: String,
    pub range: String,
}

/// Row of `/markets/{region_id}/history/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHistoryDay {
    pub date: String,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub order_count: i64,
    pub volume: i64,
}

/// Row of `/markets/prices/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub type_id: i64,
    #[serde(default)]
    pub adjusted_price: Option<f64>,
    #[serde(default)]
    pub average_price: Option<f64>,
}

/// Row of `/universe/names/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseName {
    pub id: i64,
    pub name: String,
    pub category: String,
}

/// Client for the ESI endpoints used by the reporting scripts.
#[derive(Clone)]
pub struct EsiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    pages: PageFetcher,
    cached: CachedFetcher,
    scope: CacheScope,
}

impl EsiClient {
    /// `base_url` is the versioned root, e.g. `https://esi.evetech.net/latest/`.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        pages: PageFetcher,
        cached: CachedFetcher,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url, transport, pages, cached, scope: CacheScope::Script }
    }

    /// Cache namespace for cached endpoints (default: script).
    pub fn with_scope(mut self, scope: CacheScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{path}?datasource={DATASOURCE}", self.base_url)
        } else {
            format!("{}{path}?datasource={DATASOURCE}&{query}", self.base_url)
        }
    }

    /// All orders in a region, every page. Never cached.
    pub async fn market_orders(&self, region_id: i64, order_type: OrderType) -> Result<Vec<MarketOrder>, Error> {
        let base = self.endpoint(&format!("markets/{region_id}/orders/"), &format!("order_type={order_type}&page="));
        self.pages.fetch_all_pages_as(&base, &FetchOptions::get()).await
    }

    /// Daily statistics for one type in a region.
    pub async fn market_history(&self, region_id: i64, type_id: i64) -> Result<Vec<MarketHistoryDay>, Error> {
        let url = self.endpoint(&format!("markets/{region_id}/history/"), &format!("type_id={type_id}"));
        self.cached.fetch_json(&url, &FetchOptions::get(), self.scope).await
    }

    /// Adjusted and average prices for every type.
    pub async fn market_prices(&self) -> Result<Vec<MarketPrice>, Error> {
        let url = self.endpoint("markets/prices/", "");
        self.cached.fetch_json(&url, &FetchOptions::get(), self.scope).await
    }

    /// Resolve ids to names. Not cached; any status other than 200 fails.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `ids` is empty.
    pub async fn universe_names(&self, ids: &[i64]) -> Result<Vec<UniverseName>, Error> {
        if ids.is_empty() {
            return Err(Error::InvalidInput("universe_names requires at least one id".into()));
        }

        let url = self.endpoint("universe/names/", "");
        let payload = serde_json::to_string(ids).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let options = FetchOptions::post_json(payload);

        let response = self.transport.send(&url, &options).await?;
        if response.status != 200 {
            return Err(Error::HttpStatus { url, options, status: response.status });
        }
        serde_json::from_slice(&response.body).map_err(|e| Error::malformed(&url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{ScriptedTransport, response};
    use esicache_core::{ChunkedCache, HttpMethod, MemoryCache};
    use std::time::Duration;

    fn client(transport: &Arc<ScriptedTransport>) -> EsiClient {
        let cache = ChunkedCache::new(Arc::new(MemoryCache::default()));
        let cached = CachedFetcher::new(transport.clone(), cache).with_jitter(Duration::ZERO);
        let pages = PageFetcher::new(transport.clone());
        EsiClient::new("https://esi.test/latest", transport.clone(), pages, cached)
    }

    fn order_json(order_id: i64) -> serde_json::Value {
        serde_json::json!({
            "order_id": order_id, "type_id": 34, "location_id": 60003760, "system_id": 30000142,
            "is_buy_order": false, "price": 5.1, "volume_total": 100, "volume_remain": 50,
            "min_volume": 1, "duration": 90, "issued": "2024-01-01T00:00:00Z", "range": "region"
        })
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        assert_eq!(client(&transport).base_url(), "https://esi.test/latest/");
    }

    #[tokio::test]
    async fn test_market_orders_follows_pages() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            response(200, &serde_json::json!([order_json(1)]).to_string(), Some("2")),
            response(200, &serde_json::json!([order_json(2)]).to_string(), Some("2")),
        ]));

        let orders = client(&transport).market_orders(10000002, OrderType::Sell).await.unwrap();

        assert_eq!(orders.iter().map(|o| o.order_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            transport.urls()[1],
            "https://esi.test/latest/markets/10000002/orders/?datasource=tranquility&order_type=sell&page=2"
        );
    }

    #[tokio::test]
    async fn test_market_prices_cached() {
        let body = r#"[{"type_id":34,"adjusted_price":4.9,"average_price":5.0},{"type_id":35}]"#;
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, body, None)]));
        let esi = client(&transport);

        let first = esi.market_prices().await.unwrap();
        let second = esi.market_prices().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[1].adjusted_price, None);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_market_history_url() {
        let body = r#"[{"date":"2024-01-01","average":5.0,"highest":5.5,"lowest":4.5,"order_count":10,"volume":1000}]"#;
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, body, None)]));

        let history = client(&transport).market_history(10000002, 34).await.unwrap();

        assert_eq!(history[0].volume, 1000);
        assert_eq!(
            transport.urls(),
            vec!["https://esi.test/latest/markets/10000002/history/?datasource=tranquility&type_id=34".to_string()]
        );
    }

    #[tokio::test]
    async fn test_universe_names_posts_ids() {
        let body = r#"[{"id":34,"name":"Tritanium","category":"inventory_type"}]"#;
        let transport = Arc::new(ScriptedTransport::new(vec![response(200, body, None)]));

        let names = client(&transport).universe_names(&[34]).await.unwrap();

        assert_eq!(names[0].name, "Tritanium");
        let options = transport.last_options().unwrap();
        assert_eq!(options.method, HttpMethod::Post);
        assert_eq!(options.payload.as_deref(), Some("[34]"));
    }

    #[tokio::test]
    async fn test_universe_names_rejects_empty_and_non_200() {
        let transport = Arc::new(ScriptedTransport::new(vec![response(404, "{}", None)]));
        let esi = client(&transport);

        assert!(matches!(esi.universe_names(&[]).await, Err(Error::InvalidInput(_))));
        assert!(matches!(esi.universe_names(&[1]).await, Err(Error::HttpStatus { status: 404, .. })));
    }
}
