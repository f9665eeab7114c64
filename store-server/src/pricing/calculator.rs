//! Fee schedule and voucher application
//!
//! All amounts are integer currency units.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, Voucher, VoucherType};

/// Maximum orderable unit price
pub const MAX_ORDER_PRICE: i64 = 500_000;
/// Orderable quantity bounds (gifts are forced to 1 by the order action)
pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 5;

/// Tiered service fee schedule.
///
/// The tiers are closed intervals with gaps (10001–10099, 99901–99999 and
/// everything above 500000 fall through to 0). The gaps match the
/// upstream storefront's schedule and are covered by tests; do not "fix"
/// them here without changing the storefront too.
pub fn service_fee(price: i64) -> i64 {
    match price {
        100..=10_000 => 500,
        10_100..=99_900 => 1_000,
        100_000..=500_000 => 3_000,
        _ => 0,
    }
}

/// Validate a voucher against an order and compute its deduction.
///
/// `price` is the unit price, `fee` the already-computed service fee.
/// `caller_email` comes from the verified identity; the account record
/// supplies the display name for scope matching.
///
/// Returns the deduction in currency units. The caller is responsible for
/// the code lookup (`VoucherNotFound`) and for incrementing the
/// redemption count inside the same transaction that uses the result.
pub fn apply_voucher(
    voucher: &Voucher,
    price: i64,
    quantity: i64,
    fee: i64,
    account: &Account,
    caller_email: Option<&str>,
    now: i64,
) -> AppResult<i64> {
    if account.has_redeemed_voucher(&voucher.id) {
        return Err(AppError::new(ErrorCode::VoucherAlreadyRedeemed));
    }
    if voucher.limit_reached() {
        return Err(AppError::new(ErrorCode::VoucherLimitReached));
    }
    if voucher.is_expired(now) {
        return Err(AppError::new(ErrorCode::VoucherExpired));
    }
    if let Some(scope) = voucher.restricted_to() {
        let matches = caller_email == Some(scope)
            || account.email.as_deref() == Some(scope)
            || account.display_name.as_deref() == Some(scope);
        if !matches {
            return Err(AppError::with_message(
                ErrorCode::VoucherNotEligible,
                "Voucher is not available to this user",
            ));
        }
    }

    match voucher.voucher_type {
        VoucherType::Discount => {
            if let Some(min_quantity) = voucher.orders_amount {
                if quantity < min_quantity {
                    return Err(AppError::with_message(
                        ErrorCode::VoucherNotEligible,
                        format!("Voucher requires at least {min_quantity} items"),
                    ));
                }
            }
            if let Some(min_subtotal) = voucher.valid_price {
                if price * quantity < min_subtotal {
                    return Err(AppError::with_message(
                        ErrorCode::VoucherNotEligible,
                        format!("Voucher requires a subtotal of at least {min_subtotal}"),
                    ));
                }
            }
            Ok(voucher.amount)
        }
        VoucherType::Fee => {
            if let Some(min_fee) = voucher.valid_fee {
                if fee < min_fee {
                    return Err(AppError::with_message(
                        ErrorCode::VoucherNotEligible,
                        format!("Voucher requires a service fee of at least {min_fee}"),
                    ));
                }
            }
            // amount is a percentage of the fee, capped so the fee never
            // goes negative
            let deduction = (fee * voucher.amount / 100).clamp(0, fee);
            Ok(deduction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::VoucherType;

    #[test]
    fn fee_tiers_are_exact_boundaries() {
        assert_eq!(service_fee(99), 0);
        assert_eq!(service_fee(100), 500);
        assert_eq!(service_fee(10_000), 500);
        assert_eq!(service_fee(10_001), 0);
        assert_eq!(service_fee(10_100), 1_000);
        assert_eq!(service_fee(99_900), 1_000);
        assert_eq!(service_fee(99_901), 0);
        assert_eq!(service_fee(100_000), 3_000);
        assert_eq!(service_fee(500_000), 3_000);
        assert_eq!(service_fee(500_001), 0);
    }

    #[test]
    fn negative_price_has_no_fee() {
        assert_eq!(service_fee(-1), 0);
        assert_eq!(service_fee(i64::MIN), 0);
    }

    fn account() -> Account {
        Account::new("u1", 0)
    }

    fn discount_voucher() -> Voucher {
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

    #[test]
    fn discount_voucher_deducts_flat_amount() {
        let deduction =
            apply_voucher(&discount_voucher(), 1_000, 2, 500, &account(), None, 0).unwrap();
        assert_eq!(deduction, 100);
    }

    #[test]
    fn discount_voucher_enforces_minimum_quantity_and_subtotal() {
        let mut voucher = discount_voucher();
        voucher.orders_amount = Some(3);

        let err = apply_voucher(&voucher, 1_000, 2, 500, &account(), None, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotEligible);

        voucher.orders_amount = None;
        voucher.valid_price = Some(5_000);
        let err = apply_voucher(&voucher, 1_000, 2, 500, &account(), None, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotEligible);

        // 1000 * 5 >= 5000
        let deduction = apply_voucher(&voucher, 1_000, 5, 500, &account(), None, 0).unwrap();
        assert_eq!(deduction, 100);
    }

    #[test]
    fn fee_voucher_is_a_percentage_capped_at_the_fee() {
        let mut voucher = discount_voucher();
        voucher.voucher_type = VoucherType::Fee;
        voucher.amount = 50;

        let deduction = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 0).unwrap();
        assert_eq!(deduction, 250);

        // 150% of the fee still only deducts the fee
        voucher.amount = 150;
        let deduction = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 0).unwrap();
        assert_eq!(deduction, 500);
    }

    #[test]
    fn fee_voucher_enforces_minimum_fee() {
        let mut voucher = discount_voucher();
        voucher.voucher_type = VoucherType::Fee;
        voucher.amount = 50;
        voucher.valid_fee = Some(1_000);

        let err = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotEligible);
    }

    #[test]
    fn already_redeemed_wins_over_other_failures() {
        let mut voucher = discount_voucher();
        voucher.expires_at = Some(100);
        let mut acct = account();
        acct.redeemed_voucher_ids.insert("v1".into());

        let err = apply_voucher(&voucher, 1_000, 1, 500, &acct, None, 200).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherAlreadyRedeemed);
    }

    #[test]
    fn expired_voucher_is_rejected() {
        let mut voucher = discount_voucher();
        voucher.expires_at = Some(100);
        let err = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherExpired);
    }

    #[test]
    fn limit_reached_is_rejected() {
        let mut voucher = discount_voucher();
        voucher.max_redemptions = 2;
        voucher.redemption_count = 2;
        let err = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherLimitReached);
    }

    #[test]
    fn privacy_scope_matches_email_or_display_name() {
        let mut voucher = discount_voucher();
        voucher.privacy = Some("vip@example.com".into());

        let err = apply_voucher(&voucher, 1_000, 1, 500, &account(), None, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotEligible);

        // Caller email matches
        let deduction =
            apply_voucher(&voucher, 1_000, 1, 500, &account(), Some("vip@example.com"), 0).unwrap();
        assert_eq!(deduction, 100);

        // Display name matches (weak check, preserved from the storefront)
        voucher.privacy = Some("TheChosenOne".into());
        let mut acct = account();
        acct.display_name = Some("TheChosenOne".into());
        let deduction = apply_voucher(&voucher, 1_000, 1, 500, &acct, None, 0).unwrap();
        assert_eq!(deduction, 100);
    }
}
