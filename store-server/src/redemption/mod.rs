//! Voucher-less reward redemption
//!
//! Standalone codes that grant balance (`choices`), unlock a follow-up
//! flow (`airdrop`), collect a form, or gate a secret behind a key.
//! `check_code` is a read-only preview; `redeem_code` re-validates
//! everything inside one atomic transaction.

mod engine;

pub use engine::{check_code, claimed_kinds, RedeemCodeAction, RedeemOutcome};
