//! Error categories
//!
//! Coarse classification of [`ErrorCode`](super::ErrorCode)s by failure
//! semantics. Categories are what handlers and tests branch on; codes
//! carry the precise reason.

use serde::{Deserialize, Serialize};

/// Failure taxonomy for all engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or missing input; caller's fault, no side effects
    Validation,
    /// Referenced account/order/voucher/reward does not exist
    NotFound,
    /// Identity mismatch: wrong recipient, claimer, or owner
    Unauthorized,
    /// Operation not legal in the current state
    /// (already claimed/refunded/expired/not-yet-expired)
    StateConflict,
    /// Redemption or voucher cap reached
    LimitExceeded,
    /// Sender balance cannot cover the debit
    InsufficientBalance,
    /// Third-party/catalog lookup failure
    UpstreamFailure,
    /// Store-level transaction contention or timeout; retryable
    StoreConflict,
    /// Internal fault (data integrity, serialization, store corruption)
    Internal,
}

impl ErrorCategory {
    /// Whether retrying the same operation may succeed without any change
    /// by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreConflict | Self::UpstreamFailure)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::StateConflict => "state_conflict",
            Self::LimitExceeded => "limit_exceeded",
            Self::InsufficientBalance => "insufficient_balance",
            Self::UpstreamFailure => "upstream_failure",
            Self::StoreConflict => "store_conflict",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}
