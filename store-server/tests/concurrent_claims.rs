//! Concurrency: a gift can be claimed exactly once
//!
//! Many claim attempts race on the same order. The store serializes
//! write transactions and every claim re-reads the order status, so one
//! attempt wins and all others fail with a state conflict.

use shared::error::ErrorCode;
use shared::models::CatalogProduct;
use shared::util::now_millis;
use std::sync::{Arc, Barrier};
use store_server::orders::{ClaimGiftAction, CreateOrderAction, GiftSpec};
use store_server::store::LedgerStore;

const ATTEMPTS: usize = 16;
const DAY_MS: i64 = 86_400_000;

fn create_gift(store: &LedgerStore) -> String {
    let now = now_millis();
    store
        .run_atomic(|txn| {
            let mut account = txn.account_or_new("sender", now)?;
            account.balance = 10_000;
            txn.put_account(&account)?;
            Ok(())
        })
        .unwrap();

    let action = CreateOrderAction {
        account_id: "sender".into(),
        caller_email: None,
        product: CatalogProduct {
            id: "diamonds-100".into(),
            name: "100 Diamonds".into(),
            group: None,
            price: 1_000,
            available: true,
        },
        quantity: 1,
        voucher_code: None,
        gift: Some(GiftSpec {
            recipient_id: "recipient".into(),
            expires_at: now + DAY_MS,
        }),
        delivery: None,
        now,
    };
    store
        .run_atomic(|txn| action.execute(txn))
        .unwrap()
        .order
        .id
}

#[test]
fn concurrent_claims_succeed_exactly_once() {
    let store = Arc::new(LedgerStore::open_in_memory().unwrap());
    let order_id = create_gift(&store);
    let barrier = Arc::new(Barrier::new(ATTEMPTS));

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let store = Arc::clone(&store);
            let order_id = order_id.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let action = ClaimGiftAction {
                    order_id,
                    claimer_id: "recipient".into(),
                    delivery: None,
                    now: now_millis(),
                };
                barrier.wait();
                store.run_atomic(|txn| action.execute(txn))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one claim must win");
    for result in results.iter().filter(|r| r.is_err()) {
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.code, ErrorCode::GiftAlreadyClaimed);
    }

    // The losers left nothing behind: one claim entry, counters bumped once
    let recipient = store.get_account("recipient").unwrap().unwrap();
    assert_eq!(recipient.gift_claimed_count, 1);
    assert_eq!(recipient.transaction_count, 2); // Received Gift + claim entry

    let entries = store.entries_for_account("recipient", None, 50).unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn concurrent_orders_never_overdraw_the_sender() {
    let store = Arc::new(LedgerStore::open_in_memory().unwrap());
    let now = now_millis();
    store
        .run_atomic(|txn| {
            let mut account = txn.account_or_new("sender", now)?;
            // Enough for exactly two 1500-unit orders
            account.balance = 3_000;
            txn.put_account(&account)?;
            Ok(())
        })
        .unwrap();

    let barrier = Arc::new(Barrier::new(ATTEMPTS));
    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let action = CreateOrderAction {
                    account_id: "sender".into(),
                    caller_email: None,
                    product: CatalogProduct {
                        id: "diamonds-100".into(),
                        name: "100 Diamonds".into(),
                        group: None,
                        price: 1_000,
                        available: true,
                    },
                    quantity: 1,
                    voucher_code: None,
                    gift: None,
                    delivery: None,
                    now: now_millis(),
                };
                barrier.wait();
                store.run_atomic(|txn| action.execute(txn))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 2, "balance covers exactly two orders");
    for result in results.iter().filter(|r| r.is_err()) {
        assert_eq!(
            result.as_ref().unwrap_err().code,
            ErrorCode::InsufficientBalance
        );
    }

    let account = store.get_account("sender").unwrap().unwrap();
    assert_eq!(account.balance, 0);
    assert_eq!(account.order_count, 2);
}
