/// 프로세스 내부 로트 저장소
/// 로트 id 별 비동기 뮤텍스를 행 잠금으로 사용한다. 테스트용.
// region:    --- Imports
use super::{LockedLot, LotStore};
use crate::error::StoreError;
use crate::lot::{Lot, LotPatch, NewLot};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as RowMutex, OwnedMutexGuard};
use tracing::{debug, warn};

// endregion: --- Imports

/// 저장소 시계
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

type RowLocks = HashMap<i64, Arc<RowMutex<()>>>;

// region:    --- Memory Lot Store
#[derive(Clone)]
pub struct MemoryLotStore {
    /// 커밋된 행
    rows: Arc<RwLock<BTreeMap<i64, Lot>>>,
    locks: Arc<Mutex<RowLocks>>,
    next_id: Arc<AtomicI64>,
    clock: Clock,
    lock_timeout: Duration,
}

impl Default for MemoryLotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLotStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            locks: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(0)),
            clock,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// 행 잠금 대기 제한 시간 설정
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    fn row_lock(&self, id: i64) -> Option<Arc<RowMutex<()>>> {
        if !self.rows.read().contains_key(&id) {
            return None;
        }
        let mut locks = self.locks.lock();
        Some(Arc::clone(locks.entry(id).or_default()))
    }
}

#[async_trait]
impl LotStore for MemoryLotStore {
    type Locked = MemoryLockedLot;

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Lot>, StoreError> {
        Ok(self.rows.read().values().cloned().collect())
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Lot>, StoreError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn insert(&self, lot: NewLot) -> Result<Lot, StoreError> {
        let now = (self.clock)();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let lot = Lot {
            id,
            name: lot.name,
            description: lot.description,
            start_price: lot.start_price,
            current_price: None,
            owner_id: lot.owner_id,
            created_at: now,
            auction_end_date: lot
                .auction_end_date
                .unwrap_or(now + ChronoDuration::days(7)),
        };
        self.rows.write().insert(id, lot.clone());
        Ok(lot)
    }

    async fn lock_one_for_update(&self, id: i64) -> Result<Option<MemoryLockedLot>, StoreError> {
        let Some(row_lock) = self.row_lock(id) else {
            return Ok(None);
        };

        let guard = match tokio::time::timeout(self.lock_timeout, row_lock.lock_owned()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!("{:<12} --> 행 잠금 대기 시간 초과 id: {}", "Store", id);
                return Err(StoreError::LockTimeout(id));
            }
        };

        // 대기하는 동안 삭제되었을 수 있으므로 잠금 후 다시 읽는다
        let current = self.rows.read().get(&id).cloned();
        let Some(lot) = current else {
            self.locks.lock().remove(&id);
            return Ok(None);
        };

        debug!("{:<12} --> 행 잠금 획득 id: {}", "Store", id);
        Ok(Some(MemoryLockedLot {
            rows: Arc::clone(&self.rows),
            locks: Arc::clone(&self.locks),
            clock: Arc::clone(&self.clock),
            lot,
            deleted: false,
            _guard: guard,
        }))
    }
}

// endregion: --- Memory Lot Store

// region:    --- Locked Row
/// 잠긴 행의 작업 사본. 커밋 시에만 공유 상태에 반영된다.
pub struct MemoryLockedLot {
    rows: Arc<RwLock<BTreeMap<i64, Lot>>>,
    locks: Arc<Mutex<RowLocks>>,
    clock: Clock,
    lot: Lot,
    deleted: bool,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl LockedLot for MemoryLockedLot {
    fn lot(&self) -> &Lot {
        &self.lot
    }

    async fn now(&mut self) -> Result<DateTime<Utc>, StoreError> {
        Ok((self.clock)())
    }

    async fn set_current_price(&mut self, price: Decimal) -> Result<(), StoreError> {
        self.lot.current_price = Some(price);
        Ok(())
    }

    async fn apply_patch(&mut self, patch: &LotPatch) -> Result<(), StoreError> {
        patch.apply_to(&mut self.lot);
        Ok(())
    }

    async fn delete(&mut self) -> Result<(), StoreError> {
        self.deleted = true;
        Ok(())
    }

    async fn commit(self) -> Result<Lot, StoreError> {
        let id = self.lot.id;
        if self.deleted {
            self.rows.write().remove(&id);
            self.locks.lock().remove(&id);
        } else {
            self.rows.write().insert(id, self.lot.clone());
        }
        Ok(self.lot)
    }

    async fn abort(self) -> Result<(), StoreError> {
        Ok(())
    }
}

// endregion: --- Locked Row
