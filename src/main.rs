// region:    --- Imports
use lot_auction_service::access::{PaymentServiceGate, PRICED_METHODS};
use lot_auction_service::config::Config;
use lot_auction_service::database::DatabaseManager;
use lot_auction_service::handlers::{self, AppState};
use lot_auction_service::registry::RegistryClient;
use lot_auction_service::store::{LotStore, PostgresLotStore};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .without_time()
        .with_target(false)
        .init();

    // .env 파일이 있으면 로드
    dotenvy::dotenv().ok();

    // 설정은 시작 시 한 번만 읽는다
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::connect(&config.database).await?);
    let store = Arc::new(PostgresLotStore::new(Arc::clone(&db_manager)));

    // 스키마 초기화
    if let Err(e) = store.ensure_schema().await {
        error!("{:<12} --> 스키마 초기화 실패: {}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 스키마 초기화 성공", "Main");

    // 서비스 레지스트리 등록 (실패해도 계속 진행)
    let registry = RegistryClient::new(&config.registry_service_url, config.upstream_timeout)?;
    match registry
        .register(&config.service_name, &config.service_address, &PRICED_METHODS)
        .await
    {
        Ok(service_id) => info!(
            "{:<12} --> 레지스트리 등록 성공 service_id: {}",
            "Main", service_id
        ),
        Err(e) => warn!("{:<12} --> 레지스트리 등록 실패: {}", "Main", e),
    }

    let gate = PaymentServiceGate::new(
        &config.payment_service_url,
        &config.service_name,
        config.upstream_timeout,
    )?;

    // 라우터 설정
    let routes_all = handlers::routes(AppState::new(store, Arc::new(gate)));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.service_port));
    let listener = TcpListener::bind(addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
