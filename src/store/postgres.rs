// region:    --- Imports
use super::{LockedLot, LotStore};
use crate::database::DatabaseManager;
use crate::error::StoreError;
use crate::lot::{Lot, LotPatch, NewLot, Patch};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder, Transaction};
use std::sync::Arc;
use tracing::{debug, warn};

// endregion: --- Imports

/// 잠금 대기 시간 초과 (lock_not_available)
const LOCK_NOT_AVAILABLE: &str = "55P03";

// region:    --- Postgres Lot Store
/// PostgreSQL 로트 저장소 (`SELECT ... FOR UPDATE` 행 잠금)
#[derive(Clone)]
pub struct PostgresLotStore {
    db: Arc<DatabaseManager>,
}

impl PostgresLotStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LotStore for PostgresLotStore {
    type Locked = PgLockedLot;

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.db.ensure_schema().await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Lot>, StoreError> {
        let lots = sqlx::query_as::<_, Lot>(queries::GET_ALL_LOTS)
            .fetch_all(self.db.pool())
            .await?;
        Ok(lots)
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Lot>, StoreError> {
        let lot = sqlx::query_as::<_, Lot>(queries::GET_LOT)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(lot)
    }

    /// 단일 INSERT ... RETURNING 이므로 별도 트랜잭션 없이 실행
    async fn insert(&self, lot: NewLot) -> Result<Lot, StoreError> {
        let lot = sqlx::query_as::<_, Lot>(queries::INSERT_LOT)
            .bind(lot.name)
            .bind(lot.description)
            .bind(lot.start_price)
            .bind(lot.owner_id)
            .bind(lot.auction_end_date)
            .fetch_one(self.db.pool())
            .await?;
        Ok(lot)
    }

    async fn lock_one_for_update(&self, id: i64) -> Result<Option<PgLockedLot>, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query_as::<_, Lot>(queries::LOCK_LOT)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| lock_error(id, e))?;

        match row {
            Some(lot) => {
                debug!("{:<12} --> 행 잠금 획득 id: {}", "Store", id);
                Ok(Some(PgLockedLot { id, tx, lot }))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}

fn lock_error(id: i64, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(LOCK_NOT_AVAILABLE) {
            warn!("{:<12} --> 행 잠금 대기 시간 초과 id: {}", "Store", id);
            return StoreError::LockTimeout(id);
        }
    }
    StoreError::Database(err)
}

// endregion: --- Postgres Lot Store

// region:    --- Locked Row
/// 잠긴 행과 그 트랜잭션. drop 시 sqlx 가 롤백한다.
pub struct PgLockedLot {
    id: i64,
    tx: Transaction<'static, Postgres>,
    lot: Lot,
}

#[async_trait]
impl LockedLot for PgLockedLot {
    fn lot(&self) -> &Lot {
        &self.lot
    }

    async fn now(&mut self) -> Result<DateTime<Utc>, StoreError> {
        let now = sqlx::query_scalar::<_, DateTime<Utc>>(queries::GET_DB_NOW)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(now)
    }

    async fn set_current_price(&mut self, price: Decimal) -> Result<(), StoreError> {
        self.lot = sqlx::query_as::<_, Lot>(queries::UPDATE_CURRENT_PRICE)
            .bind(self.id)
            .bind(price)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn apply_patch(&mut self, patch: &LotPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE lots SET ");
        {
            let mut fields = builder.separated(", ");
            for (column, value) in [
                ("name", &patch.name),
                ("description", &patch.description),
                ("owner_id", &patch.owner_id),
            ] {
                match value {
                    Patch::Absent => {}
                    Patch::Null => {
                        fields.push(format!("{} = NULL", column));
                    }
                    Patch::Value(v) => {
                        fields.push(format!("{} = ", column));
                        fields.push_bind_unseparated(v.clone());
                    }
                }
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(self.id);
        builder.push(queries::RETURNING_LOT);

        self.lot = builder
            .build_query_as::<Lot>()
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete(&mut self) -> Result<(), StoreError> {
        sqlx::query(queries::DELETE_LOT)
            .bind(self.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<Lot, StoreError> {
        self.tx.commit().await?;
        Ok(self.lot)
    }

    async fn abort(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

// endregion: --- Locked Row
