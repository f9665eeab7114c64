//! RefundExpiredGift action
//!
//! After the claim window closes, the original sender gets the item
//! price back (the service fee is not refunded). Only unclaimed gifts
//! are refundable; `claimed` and `refunded` are terminal.

use crate::orders::machine::{self, GiftEvent};
use crate::orders::AdvisoryOutcome;
use crate::store::TxnContext;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{EntryDetail, EntryKind, GiftEntryStatus, LedgerEntry, Order};
use shared::util::new_doc_id;

/// RefundExpiredGift action
#[derive(Debug, Clone)]
pub struct RefundGiftAction {
    pub order_id: String,
    /// Verified caller; must be the original sender
    pub caller_id: String,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundGiftOutcome {
    pub order: Order,
    /// Amount credited back to the sender
    pub refunded_amount: i64,
    /// Sender balance after the credit
    pub balance: i64,
    pub advisories: Vec<AdvisoryOutcome>,
}

impl RefundGiftAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<RefundGiftOutcome> {
        // 1. Fresh order read
        let mut order = ctx
            .order(&self.order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let Some(gift) = order.gift.clone() else {
            return Err(AppError::new(ErrorCode::GiftNotRefundable));
        };

        // 2. Authorization
        if order.account_id != self.caller_id {
            return Err(AppError::new(ErrorCode::NotGiftSender));
        }

        // 3. State machine gate rejects claimed/refunded. Legacy
        //    pending rows carry a claimed_by guard of their own.
        let next_status = machine::transition(order.status, GiftEvent::Refund)?;
        if gift.claimed_by.is_some() {
            return Err(AppError::new(ErrorCode::GiftAlreadyClaimed));
        }

        // 4. Refunds open only after the claim window closes
        if !gift.is_expired(self.now) {
            return Err(AppError::new(ErrorCode::GiftNotExpired)
                .with_detail("expires_at", gift.expires_at));
        }

        // 5. Remaining reads
        let mut sender = ctx.account_or_new(&self.caller_id, self.now)?;
        let gifted_entry = ctx.find_entry(&self.caller_id, &order.id, &[EntryKind::Gifted])?;
        let received_entry =
            ctx.find_entry(&gift.recipient_id, &order.id, &[EntryKind::ReceivedGift])?;

        // ---- writes from here on ----

        // 6. Order transition
        order.status = next_status;
        order.updated_at = self.now;
        if let Some(gift) = order.gift.as_mut() {
            gift.refunded_by = Some(self.caller_id.clone());
            gift.refunded_at = Some(self.now);
        }

        // 7. Credit the item price back (fee stays with the store)
        let refunded_amount = order.product.subtotal();
        sender.balance += refunded_amount;
        sender.record_entry(EntryKind::Refund, self.now);
        let refund_entry = LedgerEntry::new(
            new_doc_id(),
            &self.caller_id,
            ctx.next_entry_seq()?,
            refunded_amount,
            &order.reference,
            Some(order.id.clone()),
            EntryDetail::Refund {
                product_name: order.product.name.clone(),
            },
            self.now,
        );

        ctx.put_order(&order)?;
        ctx.put_account(&sender)?;
        ctx.put_entry(&refund_entry)?;

        // 8. Counterpart status flips (advisory)
        let mut advisories = Vec::new();
        match gifted_entry {
            Some(mut entry) => {
                entry.set_gift_status(GiftEntryStatus::Refunded, self.now);
                ctx.put_entry(&entry)?;
                advisories.push(AdvisoryOutcome::applied("gifted_status"));
            }
            None => {
                tracing::warn!(
                    order_id = %order.id,
                    sender_id = %self.caller_id,
                    "sender Gifted entry missing, status not flipped"
                );
                advisories.push(AdvisoryOutcome::skipped("gifted_status"));
            }
        }
        match received_entry {
            Some(mut entry) => {
                entry.set_gift_status(GiftEntryStatus::Expired, self.now);
                ctx.put_entry(&entry)?;
                advisories.push(AdvisoryOutcome::applied("received_gift_status"));
            }
            None => {
                tracing::warn!(
                    order_id = %order.id,
                    recipient_id = %gift.recipient_id,
                    "recipient Received Gift entry missing, status not flipped"
                );
                advisories.push(AdvisoryOutcome::skipped("received_gift_status"));
            }
        }

        tracing::info!(
            order_id = %order.id,
            sender_id = %self.caller_id,
            refunded_amount,
            "expired gift refunded"
        );

        Ok(RefundGiftOutcome {
            refunded_amount,
            balance: sender.balance,
            order,
            advisories,
        })
    }
}
