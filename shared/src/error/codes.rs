//! Unified error codes for the store backend
//!
//! Every failure an operation can report carries one of these codes.
//! Codes are stable across releases; clients branch on them.
//!
//! - 0xxx: General / validation
//! - 1xxx: Authentication
//! - 2xxx: Authorization
//! - 3xxx: Account / balance
//! - 4xxx: Order / gift
//! - 5xxx: Voucher
//! - 6xxx: Reward redemption
//! - 7xxx: Upstream collaborators
//! - 9xxx: Store / system

use super::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values for efficient serialization and
/// cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Authorization ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Caller is not the designated gift recipient
    NotGiftRecipient = 2002,
    /// Caller is not the original gift sender
    NotGiftSender = 2003,
    /// Caller is not the user who claimed the gift
    NotGiftClaimer = 2004,

    // ==================== 3xxx: Account / balance ====================
    /// Account not found
    AccountNotFound = 3001,
    /// Balance cannot cover the debit
    InsufficientBalance = 3002,
    /// Transfer sender and recipient are the same account
    TransferToSelf = 3003,

    // ==================== 4xxx: Order / gift ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Product not found in the catalog
    ProductNotFound = 4002,
    /// Product is not available for purchase
    ProductUnavailable = 4003,
    /// Product price outside the orderable range
    PriceOutOfRange = 4004,
    /// Quantity outside the orderable range
    QuantityOutOfRange = 4005,
    /// Gift has already been claimed
    GiftAlreadyClaimed = 4006,
    /// Gift has already been refunded
    GiftAlreadyRefunded = 4007,
    /// Gift expiration has passed
    GiftExpired = 4008,
    /// Gift expiration has not passed yet
    GiftNotExpired = 4009,
    /// Order is not a claimable gift
    GiftNotClaimable = 4010,
    /// Order is not a refundable gift
    GiftNotRefundable = 4011,
    /// Gift order is missing its sender id (data integrity fault)
    GiftSenderMissing = 4012,
    /// Delivery details can only be edited while the order is claimed
    DeliveryNotEditable = 4013,
    /// Vouchers cannot be applied to gift orders
    VoucherOnGift = 4014,

    // ==================== 5xxx: Voucher ====================
    /// Voucher code not found
    VoucherNotFound = 5001,
    /// Voucher has expired
    VoucherExpired = 5002,
    /// Voucher global redemption limit reached
    VoucherLimitReached = 5003,
    /// Voucher already redeemed by this user
    VoucherAlreadyRedeemed = 5004,
    /// Voucher requirements not met (scope or thresholds)
    VoucherNotEligible = 5005,

    // ==================== 6xxx: Reward ====================
    /// Reward code not found
    RewardNotFound = 6001,
    /// Reward has expired
    RewardExpired = 6002,
    /// Reward global redemption limit reached
    RewardLimitReached = 6003,
    /// Reward already redeemed by this user
    RewardAlreadyRedeemed = 6004,
    /// Submitted key does not match the reward's redemption key
    WrongRedemptionKey = 6005,
    /// Reward kind is not supported by this engine
    UnsupportedRewardType = 6006,
    /// Reward requires a payload that was not provided
    PayloadRequired = 6007,

    // ==================== 7xxx: Upstream ====================
    /// Product catalog lookup failed
    CatalogUnavailable = 7001,
    /// Generic upstream collaborator failure
    UpstreamError = 7002,

    // ==================== 9xxx: Store / system ====================
    /// Internal error
    InternalError = 9001,
    /// Store error
    StoreError = 9002,
    /// Store transaction conflict
    StoreConflict = 9003,
    /// Store transaction timeout
    StoreTimeout = 9004,
    /// Serialization error
    SerializationError = 9005,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Authentication required",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",

            Self::PermissionDenied => "Permission denied",
            Self::NotGiftRecipient => "Only the designated recipient can claim this gift",
            Self::NotGiftSender => "Only the original sender can refund this gift",
            Self::NotGiftClaimer => "Only the user who claimed this gift can update delivery",

            Self::AccountNotFound => "Account not found",
            Self::InsufficientBalance => "Insufficient balance",
            Self::TransferToSelf => "Cannot transfer to your own account",

            Self::OrderNotFound => "Order not found",
            Self::ProductNotFound => "Product not found",
            Self::ProductUnavailable => "Product is not available",
            Self::PriceOutOfRange => "Product price is outside the orderable range",
            Self::QuantityOutOfRange => "Quantity is outside the orderable range",
            Self::GiftAlreadyClaimed => "Gift has already been claimed",
            Self::GiftAlreadyRefunded => "Gift has already been refunded",
            Self::GiftExpired => "Gift has expired",
            Self::GiftNotExpired => "Gift has not expired yet",
            Self::GiftNotClaimable => "Order is not a claimable gift",
            Self::GiftNotRefundable => "Order is not a refundable gift",
            Self::GiftSenderMissing => "Gift order has no sender on record",
            Self::DeliveryNotEditable => "Delivery details can no longer be edited",
            Self::VoucherOnGift => "Vouchers cannot be applied to gifts",

            Self::VoucherNotFound => "Voucher code not found",
            Self::VoucherExpired => "Voucher has expired",
            Self::VoucherLimitReached => "Voucher redemption limit reached",
            Self::VoucherAlreadyRedeemed => "Voucher already redeemed",
            Self::VoucherNotEligible => "Voucher requirements not met",

            Self::RewardNotFound => "Reward code not found",
            Self::RewardExpired => "Reward has expired",
            Self::RewardLimitReached => "Reward redemption limit reached",
            Self::RewardAlreadyRedeemed => "Reward already redeemed",
            Self::WrongRedemptionKey => "Wrong redemption key",
            Self::UnsupportedRewardType => "Unsupported reward type",
            Self::PayloadRequired => "This reward requires a payload",

            Self::CatalogUnavailable => "Product catalog is unavailable",
            Self::UpstreamError => "Upstream service failure",

            Self::InternalError => "Internal error",
            Self::StoreError => "Store error",
            Self::StoreConflict => "Store transaction conflict",
            Self::StoreTimeout => "Store transaction timeout",
            Self::SerializationError => "Serialization error",
        }
    }

    /// Category this code belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Success
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::PriceOutOfRange
            | Self::QuantityOutOfRange
            | Self::VoucherOnGift
            | Self::TransferToSelf
            | Self::PayloadRequired
            | Self::WrongRedemptionKey
            | Self::UnsupportedRewardType => ErrorCategory::Validation,

            Self::NotFound
            | Self::AccountNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::VoucherNotFound
            | Self::RewardNotFound => ErrorCategory::NotFound,

            Self::NotAuthenticated
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::PermissionDenied
            | Self::NotGiftRecipient
            | Self::NotGiftSender
            | Self::NotGiftClaimer => ErrorCategory::Unauthorized,

            Self::ProductUnavailable
            | Self::GiftAlreadyClaimed
            | Self::GiftAlreadyRefunded
            | Self::GiftExpired
            | Self::GiftNotExpired
            | Self::GiftNotClaimable
            | Self::GiftNotRefundable
            | Self::DeliveryNotEditable
            | Self::VoucherExpired
            | Self::RewardExpired => ErrorCategory::StateConflict,

            Self::VoucherLimitReached
            | Self::VoucherAlreadyRedeemed
            | Self::VoucherNotEligible
            | Self::RewardLimitReached
            | Self::RewardAlreadyRedeemed => ErrorCategory::LimitExceeded,

            Self::InsufficientBalance => ErrorCategory::InsufficientBalance,

            Self::CatalogUnavailable | Self::UpstreamError => ErrorCategory::UpstreamFailure,

            Self::StoreConflict | Self::StoreTimeout => ErrorCategory::StoreConflict,

            Self::Unknown
            | Self::GiftSenderMissing
            | Self::InternalError
            | Self::StoreError
            | Self::SerializationError => ErrorCategory::Internal,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,
            1001 => Self::NotAuthenticated,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            2001 => Self::PermissionDenied,
            2002 => Self::NotGiftRecipient,
            2003 => Self::NotGiftSender,
            2004 => Self::NotGiftClaimer,
            3001 => Self::AccountNotFound,
            3002 => Self::InsufficientBalance,
            3003 => Self::TransferToSelf,
            4001 => Self::OrderNotFound,
            4002 => Self::ProductNotFound,
            4003 => Self::ProductUnavailable,
            4004 => Self::PriceOutOfRange,
            4005 => Self::QuantityOutOfRange,
            4006 => Self::GiftAlreadyClaimed,
            4007 => Self::GiftAlreadyRefunded,
            4008 => Self::GiftExpired,
            4009 => Self::GiftNotExpired,
            4010 => Self::GiftNotClaimable,
            4011 => Self::GiftNotRefundable,
            4012 => Self::GiftSenderMissing,
            4013 => Self::DeliveryNotEditable,
            4014 => Self::VoucherOnGift,
            5001 => Self::VoucherNotFound,
            5002 => Self::VoucherExpired,
            5003 => Self::VoucherLimitReached,
            5004 => Self::VoucherAlreadyRedeemed,
            5005 => Self::VoucherNotEligible,
            6001 => Self::RewardNotFound,
            6002 => Self::RewardExpired,
            6003 => Self::RewardLimitReached,
            6004 => Self::RewardAlreadyRedeemed,
            6005 => Self::WrongRedemptionKey,
            6006 => Self::UnsupportedRewardType,
            6007 => Self::PayloadRequired,
            7001 => Self::CatalogUnavailable,
            7002 => Self::UpstreamError,
            9001 => Self::InternalError,
            9002 => Self::StoreError,
            9003 => Self::StoreConflict,
            9004 => Self::StoreTimeout,
            9005 => Self::SerializationError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

/// Error returned when deserializing an unknown error code value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", *self as u16)
    }
}
