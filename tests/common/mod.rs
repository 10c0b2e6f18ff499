#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use lot_auction_service::access::{AccessDenied, AccessGate};
use lot_auction_service::lifecycle::commands::{handle_create_lot, CreateLotCommand};
use lot_auction_service::lot::{Lot, NewLot};
use lot_auction_service::store::memory::Clock;
use lot_auction_service::store::{LotStore, MemoryLotStore};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// 트레이싱 초기화
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .without_time()
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// 테스트에서 직접 움직이는 시계
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )))
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock() = at;
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }

    pub fn as_clock(&self) -> Clock {
        let inner = Arc::clone(&self.0);
        Arc::new(move || *inner.lock())
    }
}

pub fn memory_store(clock: &ManualClock) -> MemoryLotStore {
    MemoryLotStore::with_clock(clock.as_clock())
}

/// 테스트용 로트 생성
pub async fn create_test_lot<S: LotStore>(
    store: &S,
    start_price: Decimal,
    auction_end_date: Option<DateTime<Utc>>,
) -> Lot {
    let cmd = CreateLotCommand {
        lot: NewLot {
            name: "테스트 로트".to_string(),
            description: Some("동시성 입찰 테스트를 위한 로트입니다.".to_string()),
            start_price,
            owner_id: Some("seller-1".to_string()),
            auction_end_date,
        },
    };
    handle_create_lot(store, cmd).await.unwrap()
}

/// 정해진 결과를 돌려주고 호출을 기록하는 접근 검증기
pub struct RecordingGate {
    decision: Result<(), AccessDenied>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingGate {
    pub fn allow() -> Arc<Self> {
        Self::with(Ok(()))
    }

    pub fn deny(reason: AccessDenied) -> Arc<Self> {
        Self::with(Err(reason))
    }

    fn with(decision: Result<(), AccessDenied>) -> Arc<Self> {
        Arc::new(Self {
            decision,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[async_trait]
impl AccessGate for RecordingGate {
    async fn authorize(&self, token: &str, method_name: &str) -> Result<(), AccessDenied> {
        self.calls
            .lock()
            .push((token.to_string(), method_name.to_string()));
        self.decision.clone()
    }
}
