//! Order and gift lifecycle
//!
//! The state machine lives in [`machine`]; each lifecycle operation is
//! one action in [`actions`], executed inside a single store
//! transaction.

pub mod actions;
pub mod machine;

pub use actions::claim_gift::{ClaimGiftAction, ClaimGiftOutcome};
pub use actions::create_order::{CreateOrderAction, CreateOrderOutcome, GiftSpec};
pub use actions::finalize_delivery::{FinalizeDeliveryAction, FinalizeDeliveryOutcome};
pub use actions::refund_gift::{RefundGiftAction, RefundGiftOutcome};

use serde::Serialize;

/// Result of one best-effort secondary update attached to a primary
/// transition (counterpart ledger-entry status flips).
///
/// The primary transition succeeds regardless; `applied == false` means
/// the referenced entry was missing and the skip was logged.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdvisoryOutcome {
    pub name: &'static str,
    pub applied: bool,
}

impl AdvisoryOutcome {
    pub fn applied(name: &'static str) -> Self {
        Self { name, applied: true }
    }

    pub fn skipped(name: &'static str) -> Self {
        Self {
            name,
            applied: false,
        }
    }
}
