//! ClaimGift action
//!
//! Moves a gift from `sent_gift` to `claimed` for its designated
//! recipient, records delivery details, writes the recipient's claim
//! entry, and flips the counterpart entry statuses.

use crate::orders::machine::{self, GiftEvent};
use crate::orders::AdvisoryOutcome;
use crate::store::TxnContext;
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{EntryDetail, EntryKind, GiftEntryStatus, LedgerEntry, Order};
use shared::util::new_doc_id;

/// ClaimGift action
#[derive(Debug, Clone)]
pub struct ClaimGiftAction {
    pub order_id: String,
    /// Verified caller; must be the designated recipient
    pub claimer_id: String,
    /// Delivery details supplied at claim time
    pub delivery: Option<Value>,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimGiftOutcome {
    pub order: Order,
    /// Best-effort counterpart updates; the claim itself succeeded
    pub advisories: Vec<AdvisoryOutcome>,
}

impl ClaimGiftAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<ClaimGiftOutcome> {
        // 1. Fresh order read; the status re-check below is what makes
        //    "claim exactly once" hold under concurrency
        let mut order = ctx
            .order(&self.order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let Some(gift) = order.gift.clone() else {
            return Err(AppError::new(ErrorCode::GiftNotClaimable));
        };

        // 2. State machine gate
        let next_status = machine::transition(order.status, GiftEvent::Claim)?;

        // 3. Authorization and expiry
        if gift.recipient_id != self.claimer_id {
            return Err(AppError::new(ErrorCode::NotGiftRecipient));
        }
        if gift.is_expired(self.now) {
            return Err(AppError::new(ErrorCode::GiftExpired));
        }
        if order.account_id.is_empty() {
            // Data integrity fault: a gift must know who paid for it
            return Err(AppError::new(ErrorCode::GiftSenderMissing));
        }

        // 4. Remaining reads: recipient account and both counterpart entries
        let mut recipient = ctx.account_or_new(&self.claimer_id, self.now)?;
        let received_entry = ctx.find_entry(
            &self.claimer_id,
            &order.id,
            &[EntryKind::ReceivedGift],
        )?;
        let gifted_entry = ctx.find_entry(&order.account_id, &order.id, &[EntryKind::Gifted])?;

        // ---- writes from here on ----

        // 5. Order transition
        order.status = next_status;
        order.updated_at = self.now;
        if let Some(gift) = order.gift.as_mut() {
            gift.claimed_by = Some(self.claimer_id.clone());
            gift.claimed_at = Some(self.now);
        }
        if self.delivery.is_some() {
            order.delivery = self.delivery.clone();
        }

        // 6. Recipient claim entry (amount 0) + counters
        recipient.gift_claimed_count += 1;
        recipient.record_entry(EntryKind::Order, self.now);
        let claim_entry = LedgerEntry::new(
            new_doc_id(),
            &self.claimer_id,
            ctx.next_entry_seq()?,
            0,
            &order.reference,
            Some(order.id.clone()),
            EntryDetail::Order {
                product_name: order.product.name.clone(),
                quantity: order.product.quantity,
                gift_claim: true,
                delivery: self.delivery.clone(),
            },
            self.now,
        );

        ctx.put_order(&order)?;
        ctx.put_account(&recipient)?;
        ctx.put_entry(&claim_entry)?;

        // 7. Counterpart status flips (advisory: a missing entry is
        //    logged, never fatal, the claim already stands)
        let mut advisories = Vec::new();
        match received_entry {
            Some(mut entry) => {
                entry.set_gift_status(GiftEntryStatus::Claimed, self.now);
                ctx.put_entry(&entry)?;
                advisories.push(AdvisoryOutcome::applied("received_gift_status"));
            }
            None => {
                tracing::warn!(
                    order_id = %order.id,
                    recipient_id = %self.claimer_id,
                    "recipient Received Gift entry missing, status not flipped"
                );
                advisories.push(AdvisoryOutcome::skipped("received_gift_status"));
            }
        }
        match gifted_entry {
            Some(mut entry) => {
                entry.set_gift_status(GiftEntryStatus::Claimed, self.now);
                ctx.put_entry(&entry)?;
                advisories.push(AdvisoryOutcome::applied("gifted_status"));
            }
            None => {
                tracing::warn!(
                    order_id = %order.id,
                    sender_id = %order.account_id,
                    "sender Gifted entry missing, status not flipped"
                );
                advisories.push(AdvisoryOutcome::skipped("gifted_status"));
            }
        }

        tracing::info!(
            order_id = %order.id,
            claimer_id = %self.claimer_id,
            "gift claimed"
        );

        Ok(ClaimGiftOutcome { order, advisories })
    }
}
