//! Redemption flows through the service facade
//!
//! Voucher single-use per user and reward idempotent-reject, exercised
//! end to end with token authentication.

use shared::error::ErrorCode;
use shared::models::{CatalogProduct, Reward, RewardKind, Voucher, VoucherType};
use shared::util::now_millis;
use std::sync::Arc;
use store_server::auth::{JwtConfig, JwtIdentityProvider};
use store_server::catalog::StaticCatalog;
use store_server::core::Config;
use store_server::redemption::RedeemOutcome;
use store_server::services::{
    CheckVoucherRequest, CreateOrderRequest, RedeemCodeRequest, Storefront,
};
use store_server::store::LedgerStore;

fn storefront() -> (Storefront, String, String) {
    let store = LedgerStore::open_in_memory().unwrap();
    store
        .run_atomic(|txn| {
            let mut account = txn.account_or_new("u1", now_millis())?;
            account.balance = 10_000;
            txn.put_account(&account)?;
            Ok(())
        })
        .unwrap();

    let catalog = StaticCatalog::new().with_product(CatalogProduct {
        id: "diamonds-100".into(),
        name: "100 Diamonds".into(),
        group: None,
        price: 1_000,
        available: true,
    });

    let jwt = JwtIdentityProvider::new(JwtConfig {
        secret: "integration-test-secret-key-32-bytes!".into(),
        issuer: "topup-store".into(),
        expiration_minutes: 60,
    });
    let token_u1 = jwt.generate_token("u1", Some("u1@example.com")).unwrap();
    let token_u2 = jwt.generate_token("u2", None).unwrap();

    let front = Storefront::new(
        Config::with_overrides("/tmp/unused"),
        store,
        Arc::new(catalog),
        Arc::new(jwt),
    );
    (front, token_u1, token_u2)
}

fn seed_voucher(front: &Storefront, voucher: Voucher) {
    front
        .store()
        .run_atomic(|txn| {
            txn.put_voucher(&voucher)?;
            Ok(())
        })
        .unwrap();
}

fn seed_reward(front: &Storefront, reward: Reward) {
    front
        .store()
        .run_atomic(|txn| {
            txn.put_reward(&reward)?;
            Ok(())
        })
        .unwrap();
}

fn voucher() -> Voucher {
    Voucher {
        id: "v1".into(),
        code: "SAVE100".into(),
        voucher_type: VoucherType::Discount,
        amount: 100,
        orders_amount: None,
        valid_price: None,
        valid_fee: None,
        privacy: None,
        redemption_count: 0,
        max_redemptions: 0,
        expires_at: None,
        created_at: 0,
        updated_at: 0,
    }
}

fn choices_reward() -> Reward {
    Reward {
        id: "r1".into(),
        code: "BONUS500".into(),
        kind: RewardKind::Choices,
        value: 500,
        redemption_count: 0,
        max_redemptions: 0,
        expires_at: None,
        form_fields: vec![],
        redemption_key: None,
        key_hint: None,
        secret_message: None,
        created_at: 0,
        updated_at: 0,
    }
}

#[tokio::test]
async fn voucher_is_single_use_per_user() {
    let (front, token, _) = storefront();
    seed_voucher(&front, voucher());

    let request = CreateOrderRequest {
        product_id: "diamonds-100".into(),
        quantity: 1,
        voucher_code: Some("SAVE100".into()),
        gift: None,
        delivery: None,
    };

    front.create_order(&token, request.clone()).await.unwrap();
    let err = front.create_order(&token, request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::VoucherAlreadyRedeemed);

    // Counted exactly once
    let stored = front.store().get_voucher("SAVE100").unwrap().unwrap();
    assert_eq!(stored.redemption_count, 1);
}

#[tokio::test]
async fn voucher_global_cap_stops_other_users() {
    let (front, token_u1, token_u2) = storefront();
    let mut v = voucher();
    v.max_redemptions = 1;
    seed_voucher(&front, v);
    front
        .store()
        .run_atomic(|txn| {
            let mut account = txn.account_or_new("u2", now_millis())?;
            account.balance = 10_000;
            txn.put_account(&account)?;
            Ok(())
        })
        .unwrap();

    let request = CreateOrderRequest {
        product_id: "diamonds-100".into(),
        quantity: 1,
        voucher_code: Some("SAVE100".into()),
        gift: None,
        delivery: None,
    };
    front.create_order(&token_u1, request.clone()).await.unwrap();

    let err = front.create_order(&token_u2, request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::VoucherLimitReached);
}

#[tokio::test]
async fn check_voucher_quotes_without_mutating() {
    let (front, token, _) = storefront();
    seed_voucher(&front, voucher());

    let quote = front
        .check_voucher(
            &token,
            CheckVoucherRequest {
                code: "save100".into(),
                product_id: "diamonds-100".into(),
                quantity: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(quote.subtotal, 1_000);
    assert_eq!(quote.fee, 500);
    assert_eq!(quote.deduction, 100);
    assert_eq!(quote.total, 1_400);

    // Still unredeemed
    let stored = front.store().get_voucher("SAVE100").unwrap().unwrap();
    assert_eq!(stored.redemption_count, 0);
}

#[tokio::test]
async fn redeem_code_is_idempotent_reject() {
    let (front, token, _) = storefront();
    seed_reward(&front, choices_reward());

    let outcome = front
        .redeem_code(
            &token,
            RedeemCodeRequest {
                code: "BONUS500".into(),
                payload: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RedeemOutcome::Credited {
            value: 500,
            balance: 10_500
        }
    );

    let err = front
        .redeem_code(
            &token,
            RedeemCodeRequest {
                code: "BONUS500".into(),
                payload: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RewardAlreadyRedeemed);

    let stored = front.store().get_reward("BONUS500").unwrap().unwrap();
    assert_eq!(stored.redemption_count, 1);
    let account = front.get_account(&token).await.unwrap();
    assert_eq!(account.balance, 10_500);
}

#[tokio::test]
async fn check_then_redeem_then_check_again() {
    let (front, token, _) = storefront();
    seed_reward(&front, choices_reward());

    let public = front
        .check_redemption_code(&token, "BONUS500")
        .await
        .unwrap();
    assert_eq!(public.value, 500);
    assert_eq!(public.kind, RewardKind::Choices);

    front
        .redeem_code(
            &token,
            RedeemCodeRequest {
                code: "BONUS500".into(),
                payload: None,
            },
        )
        .await
        .unwrap();

    let err = front
        .check_redemption_code(&token, "BONUS500")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RewardAlreadyRedeemed);
}

#[tokio::test]
async fn second_user_can_still_redeem_until_the_cap() {
    let (front, token_u1, token_u2) = storefront();
    let mut reward = choices_reward();
    reward.max_redemptions = 2;
    seed_reward(&front, reward);

    front
        .redeem_code(
            &token_u1,
            RedeemCodeRequest {
                code: "BONUS500".into(),
                payload: None,
            },
        )
        .await
        .unwrap();
    let outcome = front
        .redeem_code(
            &token_u2,
            RedeemCodeRequest {
                code: "BONUS500".into(),
                payload: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RedeemOutcome::Credited {
            value: 500,
            balance: 500
        }
    );

    // Cap reached now
    let err = front
        .check_redemption_code(&token_u1, "BONUS500")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RewardLimitReached);
}
