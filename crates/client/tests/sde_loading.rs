use std::sync::Arc;
use std::time::Duration;

use esicache_client::{CachedFetcher, FetchClient, FetchConfig, SdeLoader};
use esicache_core::{ChunkedCache, MemoryCache};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLES: [&str; 9] = [
    "invTypes",
    "invGroups",
    "invCategories",
    "invMarketGroups",
    "industryActivity",
    "industryActivityMaterials",
    "industryActivityProducts",
    "industryActivityProbabilities",
    "industryActivitySkills",
];

fn rows(table: &str) -> serde_json::Value {
    match table {
        "invTypes" => serde_json::json!([
            {"typeID": 34, "typeName": "Tritanium", "groupID": 18, "published": 1},
            {"typeID": 681, "typeName": "Clone Blueprint", "groupID": 18, "published": 1},
            {"typeID": 9999, "typeName": "Hidden Blueprint", "groupID": 18, "published": 0},
        ]),
        "invGroups" => serde_json::json!([{"groupID": 18, "groupName": "Mineral", "categoryID": 4, "published": 1}]),
        "invCategories" => serde_json::json!([{"categoryID": 4, "categoryName": "Material", "published": 1}]),
        "invMarketGroups" => serde_json::json!([]),
        "industryActivity" => serde_json::json!([
            {"typeID": 681, "activityID": 1, "time": 600},
            {"typeID": 9999, "activityID": 1, "time": 60},
        ]),
        "industryActivityMaterials" => serde_json::json!([
            {"typeID": 681, "activityID": 1, "materialTypeID": 34, "quantity": 86},
            {"typeID": 9999, "activityID": 1, "materialTypeID": 34, "quantity": 1},
        ]),
        "industryActivityProducts" => serde_json::json!([
            {"typeID": 681, "activityID": 1, "productTypeID": 165, "quantity": 1},
        ]),
        "industryActivityProbabilities" => serde_json::json!([
            {"typeID": 681, "activityID": 8, "productTypeID": 165, "probability": 0.3},
        ]),
        "industryActivitySkills" => serde_json::json!([
            {"typeID": 681, "activityID": 1, "skillID": 3380, "level": 1},
        ]),
        _ => serde_json::json!([]),
    }
}

async fn mount_tables(server: &MockServer) {
    let index: Vec<serde_json::Value> = TABLES
        .iter()
        .map(|name| serde_json::json!({"name": name, "href": format!("{}/{name}.json", server.uri())}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/tables.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(index))
        .mount(server)
        .await;

    for table in TABLES {
        Mock::given(method("GET"))
            .and(path(format!("/{table}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows(table)))
            .mount(server)
            .await;
    }
}

fn loader(server: &MockServer) -> SdeLoader {
    let client = FetchClient::new(FetchConfig::default()).unwrap();
    let cache = ChunkedCache::new(Arc::new(MemoryCache::default()));
    let fetcher = CachedFetcher::new(Arc::new(client), cache).with_jitter(Duration::ZERO);
    SdeLoader::new(fetcher, format!("{}/tables.json", server.uri()))
}

#[tokio::test]
async fn test_load_index_includes_industry_tables() {
    let server = MockServer::start().await;
    mount_tables(&server).await;

    let index = loader(&server).load_index().await.unwrap();

    assert_eq!(index.type_name(34).unwrap(), "Tritanium");
    assert_eq!(index.activity_times(681)[0].time, 600);
    assert_eq!(index.activity_materials(681)[0].quantity, 86);
    assert_eq!(index.activity_products(681)[0].product_type_id, 165);
    assert_eq!(index.activity_probabilities(681)[0].probability, 0.3);
    assert_eq!(index.activity_skills(681)[0].skill_id, 3380);
    assert!(index.activity_times(9999).is_empty());
    assert!(index.activity_materials(9999).is_empty());
    assert!(index.activity_materials(34).is_empty());
}

#[tokio::test]
async fn test_cached_tables_are_downloaded_once() {
    let server = MockServer::start().await;
    mount_tables(&server).await;
    let loader = loader(&server).with_cache(true);

    loader.load_index().await.unwrap();
    loader.load_index().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), TABLES.len() + 1);
}

#[tokio::test]
async fn test_direct_tables_are_downloaded_every_time() {
    let server = MockServer::start().await;
    mount_tables(&server).await;
    let loader = loader(&server);

    loader.load_index().await.unwrap();
    loader.load_index().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2 * TABLES.len() + 1);
}
