//! HTTP API tests driving the router in-process with a stub model

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use travelguide::api::AppState;
use travelguide::config::{MapConfig, ServerConfig};
use travelguide::{
    AnswerModel, Catalog, Category, GeocodingClient, MapLinkResolver, Spot, TravelAssistant,
    TravelGuideError, web,
};

struct StubModel(Result<String, String>);

#[async_trait]
impl AnswerModel for StubModel {
    async fn complete(&self, _system: &str, _user: &str) -> travelguide::Result<String> {
        self.0.clone().map_err(TravelGuideError::api)
    }
}

fn app(model: StubModel) -> axum::Router {
    let catalog = Arc::new(Catalog::from_categories(vec![
        (
            Category::Scenic,
            vec![Spot::new("蓬莱阁", Category::Scenic).with_detail("地址", "烟台市蓬莱区")],
        ),
        (
            Category::Romantic,
            vec![Spot::new("烟台山灯塔", Category::Romantic)],
        ),
        (Category::Family, vec![]),
    ]));

    let resolver = MapLinkResolver::new(Some("test_gaode_key")).unwrap();
    let map_config = MapConfig {
        // Nothing listens here: lookups fail fast and fall back.
        rest_base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 2,
        ..MapConfig::default()
    };
    let geocoder = GeocodingClient::new(resolver.api_key(), &map_config).unwrap();
    let assistant = TravelAssistant::new(Arc::clone(&catalog), resolver, Arc::new(model), 5);

    let state = Arc::new(AppState {
        assistant,
        catalog,
        geocoder,
    });
    web::app(state, &ServerConfig::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn query_returns_answer_with_links() {
    let app = app(StubModel(Ok("见@map:烟台:张裕酒文化博物馆 推荐游览".to_string())));

    let response = app
        .oneshot(post_json("/query", json!({"prompt": "烟台有什么博物馆"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "answer": "见🔍 地图跳转：https://uri.amap.com/search?keywords=张裕酒文化博物馆&city=烟台&callnative=1 推荐游览"
        })
    );
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let app = app(StubModel(Err("status 500".to_string())));

    let response = app
        .oneshot(post_json("/query", json!({"prompt": "蓬莱阁怎么走"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body.get("answer").is_none());
    assert!(body["error"].as_str().unwrap().contains("网络连接异常"));
}

#[tokio::test]
async fn blank_prompt_is_a_bad_request() {
    let app = app(StubModel(Ok("unused".to_string())));

    let response = app
        .oneshot(post_json("/query", json!({"prompt": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_prompt_is_rejected() {
    let app = app(StubModel(Ok("unused".to_string())));

    let response = app
        .oneshot(post_json("/query", json!({"question": "蓬莱阁"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn lists_all_spots() {
    let app = app(StubModel(Ok(String::new())));

    let response = app.oneshot(get("/api/spots")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([
            {"景点名称": "蓬莱阁", "分类": "经典景点"},
            {"景点名称": "烟台山灯塔", "分类": "浪漫景点"}
        ])
    );
}

#[tokio::test]
async fn searches_spots() {
    let app = app(StubModel(Ok(String::new())));

    let response = app
        .oneshot(get("/api/spots/search?q=%E8%93%AC%E8%8E%B1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{"景点名称": "蓬莱阁", "分类": "经典景点", "地址": "烟台市蓬莱区"}])
    );
}

#[tokio::test]
async fn spot_details_and_not_found() {
    let app = app(StubModel(Ok(String::new())));

    let response = app
        .clone()
        .oneshot(get("/api/spots/%E7%83%9F%E5%8F%B0%E5%B1%B1%E7%81%AF%E5%A1%94"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["分类"], "浪漫景点");

    let response = app
        .oneshot(get("/api/spots/%E9%BB%84%E9%B9%A4%E6%A5%BC"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn locate_falls_back_when_lookup_fails() {
    let app = app(StubModel(Ok(String::new())));

    let response = app
        .oneshot(post_json("/api/locate", json!({"text": "去青岛市旅游"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "青岛");
    assert_eq!(body["adcode"], "370600");
}

#[tokio::test]
async fn serves_index_page() {
    let app = app(StubModel(Ok(String::new())));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn geocode_lookup_failure_is_a_bad_gateway() {
    let app = app(StubModel(Ok(String::new())));

    let response = app
        .oneshot(post_json("/api/geocode", json!({"address": "蓬莱阁"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn blank_geocode_address_is_a_bad_request() {
    let app = app(StubModel(Ok(String::new())));

    let response = app
        .oneshot(post_json("/api/geocode", json!({"address": " ", "city": "烟台"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
