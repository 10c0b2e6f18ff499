/// 로트 저장소
/// 1. 조회 / 생성
/// 2. 행 잠금 (입찰, 수정, 삭제가 공유하는 유일한 동시성 제어 수단)
// region:    --- Imports
use crate::error::StoreError;
use crate::lot::{Lot, LotPatch, NewLot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub mod memory;
pub mod postgres;

pub use memory::MemoryLotStore;
pub use postgres::PostgresLotStore;

// endregion: --- Imports

// region:    --- Lot Store Trait
/// 로트 저장소 트레이트
#[async_trait]
pub trait LotStore: Send + Sync + 'static {
    type Locked: LockedLot;

    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// id 오름차순 전체 조회
    async fn fetch_all(&self) -> Result<Vec<Lot>, StoreError>;

    async fn fetch_one(&self, id: i64) -> Result<Option<Lot>, StoreError>;

    /// 종료 시각이 없으면 생성 시각 + 7일
    async fn insert(&self, lot: NewLot) -> Result<Lot, StoreError>;

    /// 트랜잭션을 시작하고 행을 배타적으로 잠근다. 행이 없으면 `None`.
    /// 같은 행을 잠그려는 다른 트랜잭션은 커밋/중단 시까지 대기한다.
    async fn lock_one_for_update(&self, id: i64) -> Result<Option<Self::Locked>, StoreError>;
}

/// 잠긴 행에 대한 트랜잭션 핸들
/// 커밋하지 않고 drop 하면 중단된다.
#[async_trait]
pub trait LockedLot: Send + Sized {
    /// 잠금 시점 이후 트랜잭션이 보고 있는 로트 상태
    fn lot(&self) -> &Lot;

    /// 저장소 기준 현재 시각 (호출자 시계가 아님)
    async fn now(&mut self) -> Result<DateTime<Utc>, StoreError>;

    async fn set_current_price(&mut self, price: Decimal) -> Result<(), StoreError>;

    async fn apply_patch(&mut self, patch: &LotPatch) -> Result<(), StoreError>;

    async fn delete(&mut self) -> Result<(), StoreError>;

    /// 커밋 후 최종 로트 상태 반환
    async fn commit(self) -> Result<Lot, StoreError>;

    async fn abort(self) -> Result<(), StoreError>;
}

// endregion: --- Lot Store Trait
