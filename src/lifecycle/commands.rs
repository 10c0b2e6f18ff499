/// 로트 생성 / 수정 / 삭제 커맨드 처리
/// 1. 생성
/// 2. 부분 수정
/// 3. 삭제
// region:    --- Imports
use crate::error::LotError;
use crate::lot::validation::{validate_name, validate_owner_id, validate_price};
use crate::lot::{Lot, LotPatch, NewLot, Patch};
use crate::store::{LockedLot, LotStore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 로트 생성 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateLotRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_price: Option<Decimal>,
    pub owner_id: Option<String>,
    pub auction_end_date: Option<DateTime<Utc>>,
}

/// 로트 생성 명령
#[derive(Debug, Clone)]
pub struct CreateLotCommand {
    pub lot: NewLot,
}

impl CreateLotCommand {
    pub fn new(request: CreateLotRequest) -> Result<Self, LotError> {
        let (Some(name), Some(start_price)) = (request.name, request.start_price) else {
            return Err(LotError::Validation(
                "Missing required fields: name, start_price".to_string(),
            ));
        };
        validate_name(&name)?;
        if let Some(owner_id) = &request.owner_id {
            validate_owner_id(owner_id)?;
        }
        let start_price = validate_price("start_price", start_price)?;

        Ok(Self {
            lot: NewLot {
                name,
                description: request.description,
                start_price,
                owner_id: request.owner_id,
                auction_end_date: request.auction_end_date,
            },
        })
    }
}

/// 로트 수정 명령
#[derive(Debug, Clone)]
pub struct UpdateLotCommand {
    pub lot_id: i64,
    pub patch: LotPatch,
}

impl UpdateLotCommand {
    pub fn new(lot_id: i64, patch: LotPatch) -> Result<Self, LotError> {
        match &patch.name {
            Patch::Null => {
                return Err(LotError::Validation("name must not be null".to_string()));
            }
            Patch::Value(name) => validate_name(name)?,
            Patch::Absent => {}
        }
        if let Patch::Value(owner_id) = &patch.owner_id {
            validate_owner_id(owner_id)?;
        }
        Ok(Self { lot_id, patch })
    }
}

/// 1. 생성 (단순 삽입이므로 잠금 없음)
pub async fn handle_create_lot<S: LotStore>(
    store: &S,
    cmd: CreateLotCommand,
) -> Result<Lot, LotError> {
    info!("{:<12} --> 로트 생성 요청 처리 시작: {:?}", "Command", cmd);
    let lot = store.insert(cmd.lot).await?;
    info!(
        "{:<12} --> 로트 생성 완료 id: {}, 종료 시각: {}",
        "Command", lot.id, lot.auction_end_date
    );
    Ok(lot)
}

/// 2. 부분 수정
/// 변경 필드가 없으면 현재 상태를 그대로 반환한다.
pub async fn handle_update_lot<S: LotStore>(
    store: &S,
    cmd: UpdateLotCommand,
) -> Result<Lot, LotError> {
    info!("{:<12} --> 로트 수정 요청 처리 시작: {:?}", "Command", cmd);

    if cmd.patch.is_empty() {
        return store.fetch_one(cmd.lot_id).await?.ok_or(LotError::NotFound);
    }

    let Some(mut locked) = store.lock_one_for_update(cmd.lot_id).await? else {
        return Err(LotError::NotFound);
    };
    locked.apply_patch(&cmd.patch).await?;
    Ok(locked.commit().await?)
}

/// 3. 삭제
/// 실제로 행이 삭제되었는지 여부를 반환한다. 없는 로트는 오류가 아니다.
pub async fn handle_delete_lot<S: LotStore>(store: &S, lot_id: i64) -> Result<bool, LotError> {
    info!("{:<12} --> 로트 삭제 요청 처리 시작 id: {}", "Command", lot_id);

    let Some(mut locked) = store.lock_one_for_update(lot_id).await? else {
        return Ok(false);
    };
    locked.delete().await?;
    locked.commit().await?;

    info!("{:<12} --> 로트 삭제 완료 id: {}", "Command", lot_id);
    Ok(true)
}

// endregion: --- Commands
