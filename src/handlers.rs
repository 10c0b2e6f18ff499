// region:    --- Imports
use crate::access::{self, require_paid_access, AccessGate};
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand, PlaceBidRequest};
use crate::error::ApiError;
use crate::lifecycle::commands::{
    handle_create_lot, handle_delete_lot, handle_update_lot, CreateLotCommand, CreateLotRequest,
    UpdateLotCommand,
};
use crate::lot::{Lot, LotPatch};
use crate::query;
use crate::store::LotStore;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
pub struct AppState<S> {
    pub store: Arc<S>,
    pub gate: Arc<dyn AccessGate>,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, gate: Arc<dyn AccessGate>) -> Self {
        Self { store, gate }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gate: Arc::clone(&self.gate),
        }
    }
}

/// 라우터 설정
pub fn routes<S: LotStore>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/lots", get(handle_get_lots::<S>).post(handle_create_lot_request::<S>))
        .route(
            "/lots/:id",
            get(handle_get_lot::<S>)
                .put(handle_update_lot_request::<S>)
                .delete(handle_delete_lot_request::<S>),
        )
        .route("/lots/:id/bid", post(handle_bid::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

// endregion: --- App State

// region:    --- Extraction Helpers

fn lot_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid lot id".to_string()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::JsonSyntaxError(_)) => {
            Err(ApiError::BadRequest("Invalid JSON payload".to_string()))
        }
        Err(JsonRejection::JsonDataError(e)) => Err(ApiError::BadRequest(format!(
            "Invalid field type: {}",
            e.body_text()
        ))),
        Err(e) => Err(ApiError::BadRequest(e.body_text())),
    }
}

// endregion: --- Extraction Helpers

// region:    --- Query Handlers

/// 헬스 체크
pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// 모든 로트 조회
pub async fn handle_get_lots<S: LotStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Lot>>, ApiError> {
    info!("{:<12} --> 모든 로트 조회", "HandlerQuery");
    let lots = query::handlers::get_all_lots(state.store.as_ref()).await?;
    Ok(Json(lots))
}

/// 로트 조회
pub async fn handle_get_lot<S: LotStore>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Lot>, ApiError> {
    let lot_id = lot_id(path)?;
    info!("{:<12} --> 로트 조회 id: {}", "HandlerQuery", lot_id);
    let lot = query::handlers::get_lot(state.store.as_ref(), lot_id).await?;
    Ok(Json(lot))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 로트 생성
pub async fn handle_create_lot_request<S: LotStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    payload: Result<Json<CreateLotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Lot>), ApiError> {
    require_paid_access(state.gate.as_ref(), &headers, access::CREATE_LOT).await?;

    let cmd = CreateLotCommand::new(json_body(payload)?)?;
    let lot = handle_create_lot(state.store.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

/// 로트 부분 수정
pub async fn handle_update_lot_request<S: LotStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<LotPatch>, JsonRejection>,
) -> Result<Json<Lot>, ApiError> {
    require_paid_access(state.gate.as_ref(), &headers, access::UPDATE_LOT).await?;

    let cmd = UpdateLotCommand::new(lot_id(path)?, json_body(payload)?)?;
    let lot = handle_update_lot(state.store.as_ref(), cmd).await?;
    Ok(Json(lot))
}

/// 로트 삭제
pub async fn handle_delete_lot_request<S: LotStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    require_paid_access(state.gate.as_ref(), &headers, access::DELETE_LOT).await?;

    let lot_id = lot_id(path)?;
    if handle_delete_lot(state.store.as_ref(), lot_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Lot not found".to_string()))
    }
}

/// 입찰
pub async fn handle_bid<S: LotStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PlaceBidRequest>, JsonRejection>,
) -> Result<Json<Lot>, ApiError> {
    require_paid_access(state.gate.as_ref(), &headers, access::PLACE_BID).await?;

    let cmd = PlaceBidCommand::new(lot_id(path)?, json_body(payload)?)?;
    let lot = handle_place_bid(state.store.as_ref(), cmd).await?;
    Ok(Json(lot))
}

// endregion: --- Command Handlers
