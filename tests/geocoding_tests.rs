//! Gaode REST lookups against a local stand-in server

use std::collections::HashMap;

use axum::{Json, Router, extract::Query, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use travelguide::config::MapConfig;
use travelguide::geocoding::Coordinates;
use travelguide::{CityInfo, GeocodingClient};

const VALID_KEY: &str = "test_gaode_key";

fn key_rejected(params: &HashMap<String, String>) -> Option<Value> {
    (params.get("key").map(String::as_str) != Some(VALID_KEY))
        .then(|| json!({"status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"}))
}

async fn geocode_geo(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if let Some(rejected) = key_rejected(&params) {
        return Json(rejected);
    }
    let body = match (params["address"].as_str(), params["city"].as_str()) {
        ("蓬莱阁", "烟台") => json!({
            "status": "1",
            "count": "1",
            "geocodes": [{"formatted_address": "山东省烟台市蓬莱区蓬莱阁", "location": "120.757355,37.825627"}]
        }),
        _ => json!({"status": "1", "count": "0", "geocodes": []}),
    };
    Json(body)
}

async fn place_text(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if let Some(rejected) = key_rejected(&params) {
        return Json(rejected);
    }
    assert_eq!(params["types"], "190100");
    let body = match params["keywords"].as_str() {
        "青岛" => json!({
            "status": "1",
            "count": "1",
            "pois": [{"name": "青岛市", "location": "120.382640,36.067082", "adcode": "370200"}]
        }),
        _ => json!({"status": "1", "count": "0", "pois": []}),
    };
    Json(body)
}

async fn spawn_gaode() -> String {
    let app = Router::new()
        .route("/geocode/geo", get(geocode_geo))
        .route("/place/text", get(place_text));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client(api_key: &str) -> GeocodingClient {
    let config = MapConfig {
        rest_base_url: spawn_gaode().await,
        timeout_seconds: 5,
        ..MapConfig::default()
    };
    GeocodingClient::new(api_key, &config).unwrap()
}

#[tokio::test]
async fn search_city_reads_centre_and_adcode() {
    let client = client(VALID_KEY).await;

    let info = client.search_city("青岛").await.unwrap();

    assert_eq!(
        info,
        Some(CityInfo {
            name: "青岛".to_string(),
            longitude: 120.382640,
            latitude: 36.067082,
            adcode: "370200".to_string(),
        })
    );
}

#[tokio::test]
async fn search_city_without_pois_is_none() {
    let client = client(VALID_KEY).await;

    assert_eq!(client.search_city("无名").await.unwrap(), None);
}

#[tokio::test]
async fn geocode_reads_first_location() {
    let client = client(VALID_KEY).await;

    let coordinates = client.geocode("蓬莱阁", "烟台").await.unwrap();

    assert_eq!(
        coordinates,
        Some(Coordinates {
            longitude: 120.757355,
            latitude: 37.825627,
        })
    );
    assert_eq!(client.geocode("蓬莱阁", "青岛").await.unwrap(), None);
}

#[tokio::test]
async fn rejected_status_gives_no_result() {
    let client = client("bad_key").await;

    assert_eq!(client.geocode("蓬莱阁", "烟台").await.unwrap(), None);
    assert_eq!(client.search_city("青岛").await.unwrap(), None);
}

#[tokio::test]
async fn locate_uses_lookup_result() {
    let client = client(VALID_KEY).await;

    let info = client.locate("去青岛市旅游").await;

    assert_eq!(info.adcode, "370200");
    assert_eq!(info.latitude, 36.067082);
}

#[tokio::test]
async fn locate_without_match_uses_fallback_centre() {
    let client = client(VALID_KEY).await;

    let info = client.locate("去长岛县旅游").await;

    assert_eq!(info, CityInfo::fallback("长岛"));
}
