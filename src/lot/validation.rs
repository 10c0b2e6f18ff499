/// 저장소 트랜잭션 전에 수행하는 입력 검증
// region:    --- Imports
use crate::error::LotError;
use rust_decimal::Decimal;

// endregion: --- Imports

/// NUMERIC(12, 2) 컬럼에 맞는 소수 자릿수
pub const PRICE_SCALE: u32 = 2;

/// NUMERIC(12, 2) 컬럼이 담을 수 있는 정수부 상한 (10^10)
const PRICE_LIMIT: i64 = 10_000_000_000;

/// 가격 검증: 음수 불가, 소수 둘째 자리까지, 컬럼 정밀도 이내
pub fn validate_price(field: &str, value: Decimal) -> Result<Decimal, LotError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LotError::Validation(format!("{} must not be negative", field)));
    }
    let normalized = value.normalize();
    if normalized.scale() > PRICE_SCALE {
        return Err(LotError::Validation(format!(
            "{} must have at most {} decimal places",
            field, PRICE_SCALE
        )));
    }
    if normalized >= Decimal::from(PRICE_LIMIT) {
        return Err(LotError::Validation(format!("{} is too large", field)));
    }
    Ok(normalized)
}

/// VARCHAR(255) 컬럼의 최대 문자 수
pub const MAX_TEXT_LEN: usize = 255;

/// 이름 검증: 공백만으로 된 이름 불가, 컬럼 길이 이내
pub fn validate_name(name: &str) -> Result<(), LotError> {
    if name.trim().is_empty() {
        return Err(LotError::Validation("name must not be empty".to_string()));
    }
    validate_length("name", name)
}

pub fn validate_owner_id(owner_id: &str) -> Result<(), LotError> {
    validate_length("owner_id", owner_id)
}

// 바이트가 아니라 문자 수 기준
fn validate_length(field: &str, value: &str) -> Result<(), LotError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(LotError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(())
}
