use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    TravelGuideError,
    assistant::TravelAssistant,
    catalog::{Catalog, DEFAULT_SEARCH_LIMIT, Spot, SpotSummary},
    geocoding::{CityInfo, GeocodingClient},
};

const MAX_SEARCH_LIMIT: usize = 50;

/// State shared by every handler; nothing in it is mutated after startup
pub struct AppState {
    pub assistant: TravelAssistant,
    pub catalog: Arc<Catalog>,
    pub geocoder: GeocodingClient,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LocateRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
    /// Defaults to the configured city
    pub city: Option<String>,
}

impl IntoResponse for TravelGuideError {
    fn into_response(self) -> Response {
        let status = match &self {
            TravelGuideError::Api { .. } => StatusCode::BAD_GATEWAY,
            TravelGuideError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Catalog and geocoding routes, nested under `/api`
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/spots", get(list_spots))
        .route("/spots/search", get(search_spots))
        .route("/spots/{name}", get(get_spot))
        .route("/locate", post(locate))
        .route("/geocode", post(geocode))
}

pub async fn query(
    State(state): State<SharedState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, TravelGuideError> {
    let answer = state.assistant.answer(&request.prompt).await?;
    Ok(Json(QueryResponse { answer }))
}

async fn list_spots(State(state): State<SharedState>) -> Json<Vec<SpotSummary>> {
    Json(state.catalog.list_all())
}

async fn search_spots(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Spot>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);
    let spots = state
        .catalog
        .search(&params.q, limit)
        .into_iter()
        .cloned()
        .collect();
    Json(spots)
}

async fn get_spot(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Spot>, (StatusCode, Json<ErrorBody>)> {
    state
        .catalog
        .get_details(&name)
        .map(|spot| Json(spot.clone()))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: format!("未找到景点：{name}"),
                }),
            )
        })
}

async fn locate(
    State(state): State<SharedState>,
    Json(request): Json<LocateRequest>,
) -> Json<CityInfo> {
    Json(state.geocoder.locate(&request.text).await)
}

async fn geocode(
    State(state): State<SharedState>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Response, TravelGuideError> {
    if request.address.trim().is_empty() {
        return Err(TravelGuideError::validation("地址不能为空"));
    }
    let city = request
        .city
        .as_deref()
        .unwrap_or(state.geocoder.default_city());

    let coordinates = state.geocoder.geocode(&request.address, city).await?;
    Ok(match coordinates {
        Some(coordinates) => Json(coordinates).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("未找到地址：{}", request.address),
            }),
        )
            .into_response(),
    })
}
