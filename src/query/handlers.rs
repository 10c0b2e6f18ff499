// region:    --- Imports
use crate::error::LotError;
use crate::lot::Lot;
use crate::store::LotStore;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 모든 로트 조회 (id 오름차순)
pub async fn get_all_lots<S: LotStore>(store: &S) -> Result<Vec<Lot>, LotError> {
    info!("{:<12} --> 모든 로트 조회", "Query");
    Ok(store.fetch_all().await?)
}

/// 로트 조회
pub async fn get_lot<S: LotStore>(store: &S, lot_id: i64) -> Result<Lot, LotError> {
    info!("{:<12} --> 로트 조회 id: {}", "Query", lot_id);
    store.fetch_one(lot_id).await?.ok_or(LotError::NotFound)
}

// endregion: --- Query Handlers
