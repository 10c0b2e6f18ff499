/// 서비스 레지스트리 등록
/// 시작 시 한 번 서비스 주소와 유료 메서드 목록을 외부 레지스트리에 알린다.
/// 실패해도 서비스는 계속 시작한다 (호출 측에서 로그만 남김).
// region:    --- Imports
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

// region:    --- Registry Error
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to reach registry service: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Registry service rejected registration: {0}")]
    Rejected(StatusCode),

    #[error("Unable to determine service id from registry response")]
    MissingServiceId,

    #[error("Failed to register method '{0}'")]
    MethodRejected(String),
}

// endregion: --- Registry Error

// region:    --- Registry Client
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(registry_service_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: registry_service_url.trim_end_matches('/').to_string(),
        })
    }

    /// 서비스 등록 후 각 메서드 등록. 레지스트리가 부여한 서비스 id 반환
    pub async fn register(
        &self,
        service_name: &str,
        service_address: &str,
        methods: &[&str],
    ) -> Result<i64, RegistryError> {
        let service_payload = json!({
            "ServiceName": service_name,
            "address": service_address,
        });
        let response = self
            .client
            .post(format!("{}/server", self.base_url))
            .json(&service_payload)
            .send()
            .await?;
        if response.status().is_client_error() || response.status().is_server_error() {
            return Err(RegistryError::Rejected(response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| RegistryError::MissingServiceId)?;
        let service_id = extract_service_id(&body).ok_or(RegistryError::MissingServiceId)?;
        info!(
            "{:<12} --> 서비스 등록 완료 id: {}, address: {}",
            "Registry", service_id, service_address
        );

        for method in methods {
            let method_payload = json!({
                "MethodName": method,
                "IsPrivate": false,
                "ServiceModelID": service_id,
            });
            let registered = self
                .client
                .post(format!("{}/method", self.base_url))
                .json(&method_payload)
                .send()
                .await
                .map(|response| response.status().is_success())
                .unwrap_or(false);
            if !registered {
                return Err(RegistryError::MethodRejected(method.to_string()));
            }
            info!("{:<12} --> 메서드 등록 완료: {}", "Registry", method);
        }

        Ok(service_id)
    }
}

/// 레지스트리 응답마다 id 필드 이름이 달라 순서대로 확인한다
fn extract_service_id(body: &Value) -> Option<i64> {
    ["id", "ID", "ServiceModelID"]
        .iter()
        .map(|key| body.get(*key))
        .chain(std::iter::once(body.get("data").and_then(|data| data.get("id"))))
        .flatten()
        .find_map(Value::as_i64)
        .filter(|id| *id > 0)
}

// endregion: --- Registry Client
