//! Order/gift state machine
//!
//! One central transition table: state × event → next state, or a typed
//! rejection. Actions consult this table instead of comparing status
//! strings locally, so an illegal transition is rejected the same way no
//! matter which operation attempts it.
//!
//! ```text
//! pending ───(refund, gift rows only)──► refunded
//! sent_gift ─┬──(claim)───► claimed
//!            └──(refund)──► refunded
//! ```
//!
//! `claimed` and `refunded` are terminal. Non-gift orders stay `pending`.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::OrderStatus;

/// Events that drive the gift lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftEvent {
    Claim,
    Refund,
    /// Delivery patch after a claim; keeps the state unchanged
    FinalizeDelivery,
}

/// Resolve `state × event`.
///
/// Time- and identity-dependent checks (expiry windows, recipient and
/// sender authorization) stay with the actions; this table is only about
/// which states admit which events.
pub fn transition(status: OrderStatus, event: GiftEvent) -> AppResult<OrderStatus> {
    use GiftEvent::*;
    use OrderStatus::*;

    match (status, event) {
        (SentGift, Claim) => Ok(Claimed),
        (SentGift, Refund) => Ok(Refunded),
        // Legacy rows: gift orders written before `sent_gift` existed are
        // still `pending`; the refund action additionally requires the
        // gift block to be present.
        (Pending, Refund) => Ok(Refunded),
        (Claimed, FinalizeDelivery) => Ok(Claimed),

        (Claimed, Claim) => Err(AppError::new(ErrorCode::GiftAlreadyClaimed)),
        (Refunded, Claim) => Err(AppError::new(ErrorCode::GiftAlreadyRefunded)),
        (Pending, Claim) => Err(AppError::new(ErrorCode::GiftNotClaimable)),

        (Claimed, Refund) => Err(AppError::new(ErrorCode::GiftAlreadyClaimed)),
        (Refunded, Refund) => Err(AppError::new(ErrorCode::GiftAlreadyRefunded)),

        (_, FinalizeDelivery) => Err(AppError::new(ErrorCode::DeliveryNotEditable)),
    }
}
