//! Unified error system for the store backend
//!
//! - [`ErrorCode`]: stable machine-checkable codes for every failure
//! - [`ErrorCategory`]: classification by failure semantics (what the
//!   caller may retry, what is its own fault, what is a state conflict)
//! - [`AppError`]: rich error type with code, message, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General / validation errors
//! - 1xxx: Authentication errors
//! - 2xxx: Authorization errors
//! - 3xxx: Account / balance errors
//! - 4xxx: Order / gift errors
//! - 5xxx: Voucher errors
//! - 6xxx: Reward redemption errors
//! - 7xxx: Upstream collaborator errors
//! - 9xxx: Store / system errors

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
