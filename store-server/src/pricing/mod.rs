//! Fee and voucher pricing
//!
//! Pure, deterministic money math: no I/O, no clock, no store access.
//! The caller supplies everything, including `now`.

mod calculator;

pub use calculator::{apply_voucher, service_fee, MAX_ORDER_PRICE, MAX_QUANTITY, MIN_QUANTITY};
