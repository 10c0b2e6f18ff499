/// 유료 메서드 접근 검증
/// 외부 결제 서비스의 토큰 검증 API 를 호출한다. 트랜잭션 시작 전에만 호출된다.
// region:    --- Imports
use crate::error::ApiError;
use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Priced Methods
pub const PLACE_BID: &str = "PlaceBid";
pub const CREATE_LOT: &str = "CreateLot";
pub const UPDATE_LOT: &str = "UpdateLot";
pub const DELETE_LOT: &str = "DeleteLot";

/// 레지스트리에 등록되는 유료 메서드 목록
pub const PRICED_METHODS: [&str; 4] = [PLACE_BID, CREATE_LOT, UPDATE_LOT, DELETE_LOT];

// endregion: --- Priced Methods

// region:    --- Access Denied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// 헤더 누락 또는 형식 오류 (결제 서비스 호출 전)
    #[error("{0}")]
    MissingCredentials(&'static str),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token validation failed")]
    Rejected,

    #[error("Access denied")]
    NotAllowed,

    #[error("{0}")]
    Unavailable(&'static str),
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        let message = err.to_string();
        match err {
            AccessDenied::MissingCredentials(_) | AccessDenied::InvalidToken => {
                ApiError::Unauthorized(message)
            }
            AccessDenied::Rejected | AccessDenied::NotAllowed => ApiError::Forbidden(message),
            AccessDenied::Unavailable(_) => ApiError::BadGateway(message),
        }
    }
}

// endregion: --- Access Denied

// region:    --- Access Gate
/// 접근 검증 트레이트
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authorize(&self, token: &str, method_name: &str) -> Result<(), AccessDenied>;
}

/// Bearer 토큰 추출
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AccessDenied> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AccessDenied::MissingCredentials(
            "Authorization header is required",
        ))?;
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AccessDenied::MissingCredentials(
            "Authorization header must use Bearer scheme",
        ))?;
    if token.trim().is_empty() {
        return Err(AccessDenied::MissingCredentials(
            "Bearer token must not be empty",
        ));
    }
    Ok(token)
}

/// 헤더에서 토큰을 꺼내 검증
pub async fn require_paid_access(
    gate: &dyn AccessGate,
    headers: &HeaderMap,
    method_name: &str,
) -> Result<(), AccessDenied> {
    let token = extract_bearer_token(headers)?;
    gate.authorize(token, method_name).await
}

/// 결제 서비스 토큰 검증 구현체
pub struct PaymentServiceGate {
    client: Client,
    check_url: String,
    service_name: String,
}

impl PaymentServiceGate {
    pub fn new(
        payment_service_url: &str,
        service_name: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            check_url: format!("{}/token/check", payment_service_url.trim_end_matches('/')),
            service_name: service_name.to_string(),
        })
    }
}

#[async_trait]
impl AccessGate for PaymentServiceGate {
    async fn authorize(&self, token: &str, method_name: &str) -> Result<(), AccessDenied> {
        let payload = serde_json::json!({
            "token": token,
            "serviceName": self.service_name,
            "methodName": method_name,
        });

        let response = match self.client.post(&self.check_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{:<12} --> 결제 서비스 호출 실패: {}", "Access", e);
                return Err(AccessDenied::Unavailable("Payment service unavailable"));
            }
        };

        let status = response.status();
        if status.is_server_error() {
            warn!("{:<12} --> 결제 서비스 오류 응답: {}", "Access", status);
            return Err(AccessDenied::Unavailable("Payment service error"));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(AccessDenied::InvalidToken);
        }
        if status.is_client_error() {
            return Err(AccessDenied::Rejected);
        }

        // `allowed` 는 반드시 불리언이어야 한다
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("{:<12} --> 결제 서비스 응답 파싱 실패: {}", "Access", e);
                return Err(AccessDenied::Unavailable(
                    "Payment service returned a malformed response",
                ));
            }
        };
        match body.get("allowed").and_then(Value::as_bool) {
            Some(true) => {
                info!("{:<12} --> 접근 허용 method: {}", "Access", method_name);
                Ok(())
            }
            Some(false) => Err(AccessDenied::NotAllowed),
            None => Err(AccessDenied::Unavailable(
                "Payment service returned a malformed response",
            )),
        }
    }
}

// endregion: --- Access Gate
