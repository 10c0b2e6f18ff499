// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Store Error
/// 저장소 계층 장애 (인프라 오류)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("timed out waiting for the row lock on lot {0}")]
    LockTimeout(i64),
}

// endregion: --- Store Error

// region:    --- Lot Error
/// 로트 작업 결과 오류
/// `Store` 를 제외한 나머지는 예상된 거절 사유이며 장애가 아니다.
#[derive(Debug, Error)]
pub enum LotError {
    #[error("Lot not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Bid must be greater than current price")]
    BidTooLow { baseline: Decimal },

    #[error("Auction has ended")]
    AuctionClosed { ended_at: DateTime<Utc> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LotError {
    pub fn is_fault(&self) -> bool {
        matches!(self, LotError::Store(_))
    }
}

// endregion: --- Lot Error

// region:    --- Api Error
/// HTTP 응답으로 변환되는 오류. 본문은 항상 `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LotError> for ApiError {
    fn from(err: LotError) -> Self {
        match err {
            LotError::NotFound => ApiError::NotFound(err.to_string()),
            LotError::Validation(message) => ApiError::BadRequest(message),
            LotError::BidTooLow { .. } => ApiError::BadRequest(err.to_string()),
            LotError::AuctionClosed { .. } => ApiError::Conflict(err.to_string()),
            LotError::Store(e) => {
                // 내부 저장소 정보는 로그에만 남긴다
                error!("{:<12} --> 저장소 오류: {}", "Handler", e);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

// endregion: --- Api Error
