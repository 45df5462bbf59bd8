use crate::core::walk::WalkSimulator;
use crate::domain::model::{DecodeResult, WalkTrace};
use crate::domain::ports::LedgerApi;
use crate::utils::error::ResolverError;
use crate::utils::validation::require_coordinate;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AppState<A> = Arc<WalkSimulator<A>>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn map_err(e: ResolverError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        ResolverError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        ResolverError::WalkError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ResolverError::BackendError { .. } | ResolverError::ApiError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            error: e.user_friendly_message(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub coordinate: String,
}

pub async fn resolve<A: LedgerApi + 'static>(
    State(state): State<AppState<A>>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<DecodeResult> {
    let coordinate = require_coordinate(&request.coordinate).map_err(map_err)?;

    tracing::info!("🔍 Dashboard resolve: {}", coordinate);
    Ok(Json(state.api().decode(coordinate).await))
}

#[derive(Debug, Deserialize)]
pub struct WalkApiRequest {
    #[serde(default)]
    pub start_coord: String,
    pub hops: Option<u32>,
    /// 未提供時沿用 `[walk]` 設定
    pub show_hop_numbers: Option<bool>,
    pub show_inspection: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct WalkApiResponse {
    pub trace: WalkTrace,
    pub dot: String,
    pub show_inspection: bool,
}

pub async fn walk<A: LedgerApi + 'static>(
    State(state): State<AppState<A>>,
    Json(request): Json<WalkApiRequest>,
) -> ApiResult<WalkApiResponse> {
    let hops = request.hops.unwrap_or(state.config().max_hops);

    let mut config = state.config().clone();
    if let Some(show) = request.show_hop_numbers {
        config.show_hop_numbers = show;
    }
    if let Some(show) = request.show_inspection {
        config.show_inspection = show;
    }

    tracing::info!("🧭 Dashboard walk: {} ({} hops)", request.start_coord, hops);
    let trace = state
        .simulate_with(&request.start_coord, hops, &config)
        .await
        .map_err(map_err)?;
    let dot = trace.to_dot();

    Ok(Json(WalkApiResponse {
        trace,
        dot,
        show_inspection: config.show_inspection,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
