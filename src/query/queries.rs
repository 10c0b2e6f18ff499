/// 모든 로트 조회
pub const GET_ALL_LOTS: &str = "SELECT id, name, description, start_price, current_price, owner_id, created_at, auction_end_date FROM lots ORDER BY id";

/// 로트 조회
pub const GET_LOT: &str = "SELECT id, name, description, start_price, current_price, owner_id, created_at, auction_end_date FROM lots WHERE id = $1";

/// 로트 행 잠금
pub const LOCK_LOT: &str = "SELECT id, name, description, start_price, current_price, owner_id, created_at, auction_end_date FROM lots WHERE id = $1 FOR UPDATE";

/// 로트 생성 (종료 시각 기본값: 생성 시각 + 7일)
pub const INSERT_LOT: &str = r#"
    INSERT INTO lots (name, description, start_price, owner_id, auction_end_date)
    VALUES ($1, $2, $3, $4, COALESCE($5::timestamptz, CURRENT_TIMESTAMP + INTERVAL '7 days'))
    RETURNING id, name, description, start_price, current_price, owner_id, created_at, auction_end_date
"#;

/// 현재 입찰가 갱신
pub const UPDATE_CURRENT_PRICE: &str = r#"
    UPDATE lots
    SET current_price = $2
    WHERE id = $1
    RETURNING id, name, description, start_price, current_price, owner_id, created_at, auction_end_date
"#;

/// 로트 삭제
pub const DELETE_LOT: &str = "DELETE FROM lots WHERE id = $1";

/// 데이터베이스 시각
pub const GET_DB_NOW: &str = "SELECT clock_timestamp()";

/// 부분 수정 RETURNING 절
pub const RETURNING_LOT: &str = " RETURNING id, name, description, start_price, current_price, owner_id, created_at, auction_end_date";
