//! Voucher model

use serde::{Deserialize, Serialize};

/// Voucher discount semantics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoucherType {
    /// Flat deduction from the order subtotal
    #[serde(rename = "Discount Voucher")]
    Discount,
    /// Percentage deduction from the computed service fee
    #[serde(rename = "Fee Voucher")]
    Fee,
}

/// Discount rule redeemable by code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    pub id: String,
    /// Stored uppercased; lookups uppercase the caller's input
    pub code: String,
    pub voucher_type: VoucherType,
    /// Flat amount for `Discount`, percentage of the fee for `Fee`
    pub amount: i64,
    /// Minimum order quantity, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_amount: Option<i64>,
    /// Minimum order subtotal, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_price: Option<i64>,
    /// Minimum computed fee, when set (Fee vouchers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_fee: Option<i64>,
    /// "global", or an email/display name the caller must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    pub redemption_count: i64,
    /// 0 = unlimited
    #[serde(default)]
    pub max_redemptions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Voucher {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn limit_reached(&self) -> bool {
        self.max_redemptions > 0 && self.redemption_count >= self.max_redemptions
    }

    /// The identifier this voucher is restricted to, if any.
    /// `None` and the literal `"global"` both mean publicly usable.
    pub fn restricted_to(&self) -> Option<&str> {
        match self.privacy.as_deref() {
            None | Some("global") => None,
            Some(scope) => Some(scope),
        }
    }
}
