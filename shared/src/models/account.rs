//! Account model

use super::ledger::EntryKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-user balance account
///
/// A mutable aggregate derived entirely from the transaction ledger.
/// Always updated in the same atomic transaction as the ledger entry that
/// causes the change; never mutated anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Game user id (external, never generated by us)
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Integer currency units; >= 0 enforced at spend time
    pub balance: i64,
    pub order_count: i64,
    pub gift_received_count: i64,
    pub gift_claimed_count: i64,
    pub transaction_count: i64,
    /// Per-entry-kind counters (keyed by the ledger kind's wire name)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kind_counts: BTreeMap<String, i64>,
    /// Set once, on the account's first ledger entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_transaction_at: Option<i64>,
    /// Grows only; drives the one-redemption-per-user voucher rule
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub redeemed_voucher_ids: BTreeSet<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Account {
    /// Fresh account with zero balance and no history
    pub fn new(id: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            balance: 0,
            order_count: 0,
            gift_received_count: 0,
            gift_claimed_count: 0,
            transaction_count: 0,
            kind_counts: BTreeMap::new(),
            first_transaction_at: None,
            redeemed_voucher_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record that a ledger entry of `kind` was written for this account.
    ///
    /// Bumps the aggregate transaction counter and the per-kind counter,
    /// and pins `first_transaction_at` on the very first entry. Balance
    /// and the order/gift counters are adjusted by the action that owns
    /// the transition.
    pub fn record_entry(&mut self, kind: EntryKind, now: i64) {
        self.transaction_count += 1;
        *self.kind_counts.entry(kind.as_str().to_string()).or_insert(0) += 1;
        self.first_transaction_at.get_or_insert(now);
        self.updated_at = now;
    }

    pub fn has_redeemed_voucher(&self, voucher_id: &str) -> bool {
        self.redeemed_voucher_ids.contains(voucher_id)
    }
}
