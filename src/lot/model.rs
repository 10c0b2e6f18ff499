use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// 경매 상품(로트) 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lot {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_price: Decimal,
    pub current_price: Option<Decimal>,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub auction_end_date: DateTime<Utc>,
}

impl Lot {
    /// 새 입찰이 넘어야 하는 기준 가격
    pub fn baseline_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.start_price)
    }

    /// 종료 시각이 `now` 보다 엄격히 뒤인 경우에만 입찰 가능
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.auction_end_date > now
    }
}

// 신규 로트 (검증 완료된 입력)
#[derive(Debug, Clone)]
pub struct NewLot {
    pub name: String,
    pub description: Option<String>,
    pub start_price: Decimal,
    pub owner_id: Option<String>,
    /// 없으면 저장소가 생성 시각 + 7일로 계산
    pub auction_end_date: Option<DateTime<Utc>>,
}

/// 부분 수정 필드: 생략 / 명시적 null / 값
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

// 필드가 존재하면 null 또는 값, 존재하지 않으면 `#[serde(default)]` 로 Absent
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

// 로트 부분 수정 (가격, 생성 시각, 종료 시각은 대상이 아님)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LotPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub owner_id: Patch<String>,
}

impl LotPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_absent() && self.description.is_absent() && self.owner_id.is_absent()
    }

    /// 메모리 상의 로트에 수정 사항 적용
    pub fn apply_to(&self, lot: &mut Lot) {
        if let Patch::Value(name) = &self.name {
            lot.name = name.clone();
        }
        apply_nullable(&self.description, &mut lot.description);
        apply_nullable(&self.owner_id, &mut lot.owner_id);
    }
}

fn apply_nullable(patch: &Patch<String>, field: &mut Option<String>) {
    match patch {
        Patch::Absent => {}
        Patch::Null => *field = None,
        Patch::Value(value) => *field = Some(value.clone()),
    }
}
