//! FinalizeGiftDelivery action
//!
//! Lets the claimer adjust delivery details after claiming, while the
//! order is still in `claimed`. Patches both the order and the
//! recipient's claim ledger entry.

use crate::orders::machine::{self, GiftEvent};
use crate::orders::AdvisoryOutcome;
use crate::store::TxnContext;
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{EntryDetail, EntryKind, Order};

/// FinalizeGiftDelivery action
#[derive(Debug, Clone)]
pub struct FinalizeDeliveryAction {
    pub order_id: String,
    /// Verified caller; must be the user who claimed the gift
    pub caller_id: String,
    pub delivery: Value,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeDeliveryOutcome {
    pub order: Order,
    pub advisories: Vec<AdvisoryOutcome>,
}

impl FinalizeDeliveryAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<FinalizeDeliveryOutcome> {
        // 1. Fresh order read and state gate
        let mut order = ctx
            .order(&self.order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        machine::transition(order.status, GiftEvent::FinalizeDelivery)?;

        // 2. Only the claimer may edit delivery
        let claimed_by = order.gift.as_ref().and_then(|g| g.claimed_by.clone());
        if claimed_by.as_deref() != Some(self.caller_id.as_str()) {
            return Err(AppError::new(ErrorCode::NotGiftClaimer));
        }

        // 3. Read the recipient's claim entry before writing anything
        let claim_entry = ctx.find_entry(&self.caller_id, &order.id, &[EntryKind::Order])?;

        // ---- writes from here on ----

        order.delivery = Some(self.delivery.clone());
        order.updated_at = self.now;
        ctx.put_order(&order)?;

        let mut advisories = Vec::new();
        match claim_entry {
            Some(mut entry) => {
                if let EntryDetail::Order { delivery, .. } = &mut entry.detail {
                    *delivery = Some(self.delivery.clone());
                }
                entry.updated_at = self.now;
                ctx.put_entry(&entry)?;
                advisories.push(AdvisoryOutcome::applied("claim_entry_delivery"));
            }
            None => {
                tracing::warn!(
                    order_id = %order.id,
                    claimer_id = %self.caller_id,
                    "claim entry missing, delivery not patched"
                );
                advisories.push(AdvisoryOutcome::skipped("claim_entry_delivery"));
            }
        }

        Ok(FinalizeDeliveryOutcome { order, advisories })
    }
}
