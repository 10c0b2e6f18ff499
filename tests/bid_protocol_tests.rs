mod common;

use chrono::Duration;
use common::{create_test_lot, init_tracing, memory_store, ManualClock};
use lot_auction_service::bidding::commands::{handle_place_bid, PlaceBidCommand};
use lot_auction_service::error::{LotError, StoreError};
use lot_auction_service::store::{LockedLot, LotStore, MemoryLotStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn bid(lot_id: i64, bid_amount: Decimal) -> PlaceBidCommand {
    PlaceBidCommand { lot_id, bid_amount }
}

/// 입찰 -> 낮은 입찰 -> 종료 후 입찰
#[tokio::test]
async fn test_bid_sequence_until_close() {
    init_tracing();
    let clock = ManualClock::new();
    let store = memory_store(&clock);
    let lot = create_test_lot(&store, dec!(100), Some(clock.now() + Duration::hours(1))).await;

    let updated = handle_place_bid(&store, bid(lot.id, dec!(150))).await.unwrap();
    assert_eq!(updated.current_price, Some(dec!(150)));
    assert_eq!(updated.start_price, dec!(100));

    // 기준가는 이제 시작가 100 이 아니라 150
    let err = handle_place_bid(&store, bid(lot.id, dec!(120))).await.unwrap_err();
    assert!(matches!(err, LotError::BidTooLow { baseline } if baseline == dec!(150)));

    clock.advance(Duration::hours(2));
    let err = handle_place_bid(&store, bid(lot.id, dec!(200))).await.unwrap_err();
    assert!(matches!(err, LotError::AuctionClosed { ended_at } if ended_at == lot.auction_end_date));

    let stored = store.fetch_one(lot.id).await.unwrap().unwrap();
    assert_eq!(stored.current_price, Some(dec!(150)));
}

#[tokio::test]
async fn test_bid_must_exceed_start_price() {
    let clock = ManualClock::new();
    let store = memory_store(&clock);
    let lot = create_test_lot(&store, dec!(100), None).await;

    let err = handle_place_bid(&store, bid(lot.id, dec!(100))).await.unwrap_err();
    assert!(matches!(err, LotError::BidTooLow { baseline } if baseline == dec!(100)));
    assert!(!err.is_fault());

    let stored = store.fetch_one(lot.id).await.unwrap().unwrap();
    assert_eq!(stored.current_price, None);

    let updated = handle_place_bid(&store, bid(lot.id, dec!(100.01))).await.unwrap();
    assert_eq!(updated.current_price, Some(dec!(100.01)));
}

#[tokio::test]
async fn test_bid_at_exact_end_time_is_closed() {
    let clock = ManualClock::new();
    let store = memory_store(&clock);
    let end = clock.now() + Duration::minutes(5);
    let lot = create_test_lot(&store, dec!(10), Some(end)).await;

    clock.set(end);
    let err = handle_place_bid(&store, bid(lot.id, dec!(11))).await.unwrap_err();
    assert!(matches!(err, LotError::AuctionClosed { .. }));
}

#[tokio::test]
async fn test_low_bid_reported_before_closed_auction() {
    let clock = ManualClock::new();
    let store = memory_store(&clock);
    let lot = create_test_lot(&store, dec!(10), Some(clock.now() - Duration::minutes(1))).await;

    let err = handle_place_bid(&store, bid(lot.id, dec!(5))).await.unwrap_err();
    assert!(matches!(err, LotError::BidTooLow { .. }));

    let err = handle_place_bid(&store, bid(lot.id, dec!(50))).await.unwrap_err();
    assert!(matches!(err, LotError::AuctionClosed { .. }));
}

#[tokio::test]
async fn test_bid_on_unknown_lot() {
    let store = MemoryLotStore::new();
    let err = handle_place_bid(&store, bid(42, dec!(1))).await.unwrap_err();
    assert!(matches!(err, LotError::NotFound));
}

/// 증가하는 입찰 50건 동시 실행: 최종 가격은 최고 입찰가
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increasing_bids() {
    init_tracing();
    let store = Arc::new(MemoryLotStore::new());
    let lot_id = create_test_lot(store.as_ref(), dec!(100), None).await.id;

    let mut handles = vec![];
    for i in 1..=50i64 {
        let store = Arc::clone(&store);
        let amount = dec!(100) + Decimal::from(i);
        handles.push(tokio::spawn(async move {
            (amount, handle_place_bid(store.as_ref(), bid(lot_id, amount)).await)
        }));
    }

    let mut accepted = vec![];
    for handle in handles {
        let (amount, result) = handle.await.unwrap();
        match result {
            Ok(updated) => {
                assert_eq!(updated.current_price, Some(amount));
                accepted.push(amount);
            }
            Err(LotError::BidTooLow { baseline }) => assert!(baseline >= amount),
            Err(e) => panic!("unexpected bid failure: {:?}", e),
        }
    }

    let max_accepted = accepted.iter().max().copied().unwrap();
    assert_eq!(max_accepted, dec!(150));

    let stored = store.fetch_one(lot_id).await.unwrap().unwrap();
    assert_eq!(stored.current_price, Some(max_accepted));
}

/// 같은 금액 동시 입찰은 정확히 한 건만 성공
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_bids_accept_exactly_one() {
    let store = Arc::new(MemoryLotStore::new());
    let lot_id = create_test_lot(store.as_ref(), dec!(100), None).await.id;

    let mut handles = vec![];
    for _ in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            handle_place_bid(store.as_ref(), bid(lot_id, dec!(500))).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(LotError::BidTooLow { baseline }) => assert_eq!(baseline, dec!(500)),
            Err(e) => panic!("unexpected bid failure: {:?}", e),
        }
    }
    assert_eq!(successes, 1);
}

/// 대기 중인 입찰은 앞선 트랜잭션이 커밋한 가격을 기준가로 본다
#[tokio::test]
async fn test_waiting_bid_observes_committed_price() {
    let store = Arc::new(MemoryLotStore::new());
    let lot_id = create_test_lot(store.as_ref(), dec!(100), None).await.id;

    let mut locked = store.lock_one_for_update(lot_id).await.unwrap().unwrap();
    locked.set_current_price(dec!(200)).await.unwrap();

    let waiting = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { handle_place_bid(store.as_ref(), bid(lot_id, dec!(150))).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!waiting.is_finished());

    // 커밋 전에는 읽기 쪽에서 이전 상태만 보인다
    let before = store.fetch_one(lot_id).await.unwrap().unwrap();
    assert_eq!(before.current_price, None);

    locked.commit().await.unwrap();

    let err = waiting.await.unwrap().unwrap_err();
    assert!(matches!(err, LotError::BidTooLow { baseline } if baseline == dec!(200)));
}

#[tokio::test]
async fn test_aborted_transaction_leaves_price_untouched() {
    let store = MemoryLotStore::new();
    let lot = create_test_lot(&store, dec!(100), None).await;

    let mut locked = store.lock_one_for_update(lot.id).await.unwrap().unwrap();
    locked.set_current_price(dec!(999)).await.unwrap();
    locked.abort().await.unwrap();

    let stored = store.fetch_one(lot.id).await.unwrap().unwrap();
    assert_eq!(stored.current_price, None);

    // 잠금이 해제되었으므로 다음 입찰은 바로 진행된다
    let updated = handle_place_bid(&store, bid(lot.id, dec!(101))).await.unwrap();
    assert_eq!(updated.current_price, Some(dec!(101)));
}

/// 잠금 대기 시간 초과는 재시도 없이 인프라 장애로 보고된다
#[tokio::test]
async fn test_lock_wait_timeout_is_fault() {
    let store = MemoryLotStore::new().with_lock_timeout(std::time::Duration::from_millis(50));
    let lot = create_test_lot(&store, dec!(100), None).await;

    let held = store.lock_one_for_update(lot.id).await.unwrap().unwrap();

    let err = handle_place_bid(&store, bid(lot.id, dec!(150))).await.unwrap_err();
    assert!(err.is_fault());
    assert!(matches!(err, LotError::Store(StoreError::LockTimeout(id)) if id == lot.id));

    drop(held);
    let updated = handle_place_bid(&store, bid(lot.id, dec!(150))).await.unwrap();
    assert_eq!(updated.current_price, Some(dec!(150)));
}

/// 서로 다른 로트의 입찰은 서로를 막지 않는다
#[tokio::test]
async fn test_bids_on_different_lots_do_not_block() {
    let store = MemoryLotStore::new().with_lock_timeout(std::time::Duration::from_millis(50));
    let first = create_test_lot(&store, dec!(100), None).await;
    let second = create_test_lot(&store, dec!(100), None).await;

    let _held = store.lock_one_for_update(first.id).await.unwrap().unwrap();
    let updated = handle_place_bid(&store, bid(second.id, dec!(120))).await.unwrap();
    assert_eq!(updated.current_price, Some(dec!(120)));
}
