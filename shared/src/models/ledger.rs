//! Ledger entry model
//!
//! Entries are append-only. The only mutation allowed after creation is
//! the embedded gift status (and `updated_at`), which evolves as the
//! order state machine progresses.

use super::reward::RewardKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ledger entry classification
///
/// Wire names match the storefront's transaction type strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Order,
    Receive,
    Sent,
    Redeemed,
    Gifted,
    #[serde(rename = "Received Gift")]
    ReceivedGift,
    Refund,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "Order",
            Self::Receive => "Receive",
            Self::Sent => "Sent",
            Self::Redeemed => "Redeemed",
            Self::Gifted => "Gifted",
            Self::ReceivedGift => "Received Gift",
            Self::Refund => "Refund",
        }
    }
}

/// Display status embedded in gift-bearing entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GiftEntryStatus {
    #[default]
    Pending,
    Claimed,
    Refunded,
    Expired,
}

/// Kind-specific entry payload
///
/// One variant per [`EntryKind`], each carrying only the fields that kind
/// needs. The serialized tag is the kind's wire name, so an entry's kind
/// and its payload cannot drift apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EntryDetail {
    /// Direct purchase, or the recipient-side record of a claimed gift
    Order {
        product_name: String,
        quantity: i64,
        /// True when this entry records a claimed gift (amount 0)
        #[serde(default)]
        gift_claim: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        delivery: Option<Value>,
    },
    /// Balance credit: a `choices` reward or an incoming transfer
    Receive {
        #[serde(skip_serializing_if = "Option::is_none")]
        reward_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sender_id: Option<String>,
    },
    /// Outgoing balance transfer
    Sent { recipient_id: String },
    /// Record-only reward redemption (airdrop / form / redemptionKey)
    Redeemed { reward_kind: RewardKind },
    /// Sender side of a gift order
    Gifted {
        product_name: String,
        recipient_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient_name: Option<String>,
        status: GiftEntryStatus,
    },
    /// Recipient side of a gift order (amount 0)
    #[serde(rename = "Received Gift")]
    ReceivedGift {
        product_name: String,
        sender_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sender_name: Option<String>,
        status: GiftEntryStatus,
    },
    /// Credit back to the sender for an expired, unclaimed gift
    Refund { product_name: String },
}

impl EntryDetail {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Order { .. } => EntryKind::Order,
            Self::Receive { .. } => EntryKind::Receive,
            Self::Sent { .. } => EntryKind::Sent,
            Self::Redeemed { .. } => EntryKind::Redeemed,
            Self::Gifted { .. } => EntryKind::Gifted,
            Self::ReceivedGift { .. } => EntryKind::ReceivedGift,
            Self::Refund { .. } => EntryKind::Refund,
        }
    }
}

/// One immutable transaction record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: String,
    /// Owning account
    pub account_id: String,
    /// Store-wide sequence, monotonic by creation
    pub seq: u64,
    /// Signed amount in integer currency units (0 for record-only entries)
    pub amount: i64,
    /// Human-facing order/voucher/reward code
    pub reference: String,
    /// Foreign key to the Order or Voucher/Reward that caused this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_doc_id: Option<String>,
    pub detail: EntryDetail,
    /// Optional display-only fields; never drives behavior
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LedgerEntry {
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        seq: u64,
        amount: i64,
        reference: impl Into<String>,
        related_doc_id: Option<String>,
        detail: EntryDetail,
        now: i64,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            seq,
            amount,
            reference: reference.into(),
            related_doc_id,
            detail,
            extra: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.detail.kind()
    }

    /// Embedded gift status, if this entry kind carries one
    pub fn gift_status(&self) -> Option<GiftEntryStatus> {
        match &self.detail {
            EntryDetail::Gifted { status, .. } | EntryDetail::ReceivedGift { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Flip the embedded gift status. Returns false (and changes nothing)
    /// when this entry kind has no status to flip.
    pub fn set_gift_status(&mut self, new_status: GiftEntryStatus, now: i64) -> bool {
        match &mut self.detail {
            EntryDetail::Gifted { status, .. } | EntryDetail::ReceivedGift { status, .. } => {
                *status = new_status;
                self.updated_at = now;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_tag_matches_kind_wire_name() {
        let detail = EntryDetail::ReceivedGift {
            product_name: "100 Diamonds".into(),
            sender_id: "u1".into(),
            sender_name: None,
            status: GiftEntryStatus::Pending,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "Received Gift");
        assert_eq!(json["status"], "pending");
        assert_eq!(detail.kind().as_str(), "Received Gift");
    }

    #[test]
    fn gift_status_flips_only_on_gift_entries() {
        let mut entry = LedgerEntry::new(
            "e1",
            "u1",
            1,
            -500,
            "ORD-000001",
            Some("o1".into()),
            EntryDetail::Order {
                product_name: "100 Diamonds".into(),
                quantity: 1,
                gift_claim: false,
                delivery: None,
            },
            1_000,
        );
        assert!(!entry.set_gift_status(GiftEntryStatus::Claimed, 2_000));
        assert_eq!(entry.updated_at, 1_000);

        let mut gifted = LedgerEntry::new(
            "e2",
            "u1",
            2,
            -500,
            "ORD-000002",
            Some("o2".into()),
            EntryDetail::Gifted {
                product_name: "100 Diamonds".into(),
                recipient_id: "u2".into(),
                recipient_name: None,
                status: GiftEntryStatus::Pending,
            },
            1_000,
        );
        assert!(gifted.set_gift_status(GiftEntryStatus::Claimed, 2_000));
        assert_eq!(gifted.gift_status(), Some(GiftEntryStatus::Claimed));
        assert_eq!(gifted.updated_at, 2_000);
    }
}
