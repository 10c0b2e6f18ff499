/// 입찰 커맨드 처리
/// 한 로트에 대한 입찰은 행 잠금 트랜잭션 하나 안에서 기준가 조회, 검증, 갱신을 모두 수행한다.
// region:    --- Imports
use crate::error::LotError;
use crate::lot::validation::validate_price;
use crate::lot::Lot;
use crate::store::{LockedLot, LotStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Clone)]
pub struct PlaceBidCommand {
    pub lot_id: i64,
    pub bid_amount: Decimal,
}

/// 입찰 요청 본문
#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub bid_amount: Option<Decimal>,
}

impl PlaceBidCommand {
    /// 요청 검증 후 명령 생성 (저장소 접근 전)
    pub fn new(lot_id: i64, request: PlaceBidRequest) -> Result<Self, LotError> {
        let bid_amount = request
            .bid_amount
            .ok_or_else(|| LotError::Validation("Missing field: bid_amount".to_string()))?;
        Ok(Self {
            lot_id,
            bid_amount: validate_price("bid_amount", bid_amount)?,
        })
    }
}

/// 입찰
/// 1. 행 잠금 (없으면 NotFound)
/// 2. 기준가 = 현재가 또는 시작가
/// 3. 입찰가 <= 기준가 이면 BidTooLow
/// 4. 종료 시각이 저장소 기준 현재 시각보다 뒤가 아니면 AuctionClosed
/// 5. 현재가 갱신 후 커밋
pub async fn handle_place_bid<S: LotStore>(
    store: &S,
    cmd: PlaceBidCommand,
) -> Result<Lot, LotError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    let Some(mut locked) = store.lock_one_for_update(cmd.lot_id).await? else {
        return Err(LotError::NotFound);
    };

    let baseline = locked.lot().baseline_price();
    if cmd.bid_amount <= baseline {
        locked.abort().await?;
        info!(
            "{:<12} --> 입찰 거절 (기준가 이하) id: {}, 기준가: {}, 입찰가: {}",
            "Command", cmd.lot_id, baseline, cmd.bid_amount
        );
        return Err(LotError::BidTooLow { baseline });
    }

    let now = locked.now().await?;
    if !locked.lot().is_open_at(now) {
        let ended_at = locked.lot().auction_end_date;
        locked.abort().await?;
        info!(
            "{:<12} --> 입찰 거절 (경매 종료) id: {}, 종료 시각: {}",
            "Command", cmd.lot_id, ended_at
        );
        return Err(LotError::AuctionClosed { ended_at });
    }

    locked.set_current_price(cmd.bid_amount).await?;
    let lot = locked.commit().await?;

    info!(
        "{:<12} --> 입찰 성공 id: {}, 현재가: {}",
        "Command", lot.id, cmd.bid_amount
    );
    Ok(lot)
}

// endregion: --- Commands
