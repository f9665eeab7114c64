//! Order model

use super::product::ProductSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order lifecycle states
///
/// `pending` is where non-gift orders start and stay; gifts start at
/// `sent_gift` and end at `claimed` or `refunded`. Transitions are
/// validated centrally by the state machine, never by ad hoc comparisons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    SentGift,
    Claimed,
    Refunded,
}

/// Voucher application recorded on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherUse {
    pub voucher_id: String,
    pub code: String,
    /// Amount deducted from the order total
    pub deduction: i64,
}

/// Gift block present on gift orders only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GiftInfo {
    pub recipient_id: String,
    /// Sender display name snapshot, shown to the recipient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Claim deadline; at or past this instant the gift is refundable
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<i64>,
}

impl GiftInfo {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// One purchase, direct or gift
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Paying user
    pub account_id: String,
    /// Human-readable reference (from the store order counter)
    pub reference: String,
    pub product: ProductSnapshot,
    /// Service fee computed from the price tier schedule
    pub fee: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<VoucherUse>,
    /// subtotal + fee - voucher deduction
    pub final_amount_paid: i64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift: Option<GiftInfo>,
    /// Opaque delivery details (game server, character name, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_gift(&self) -> bool {
        self.gift.is_some()
    }

    pub fn voucher_deduction(&self) -> i64 {
        self.voucher.as_ref().map(|v| v.deduction).unwrap_or(0)
    }
}
