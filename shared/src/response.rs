//! API Response types
//!
//! Standardized operation outcome envelope: every exposed operation
//! resolves to one of these, carrying a success flag, a stable error
//! code, a human-readable message, and an optional payload.

use crate::error::{AppError, ErrorCategory, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unified operation response structure
///
/// ```json
/// {
///     "success": true,
///     "code": 0,
///     "message": "Success",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Error code (0 for success)
    pub code: ErrorCode,
    /// Failure taxonomy category (omitted on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    /// Human-readable message
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: ErrorCode::Success,
            category: None,
            message: "Success".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Create a successful response with a custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::ok(data)
        }
    }

    /// Create an error response from an [`AppError`]
    pub fn from_error(err: &AppError) -> Self {
        Self {
            success: false,
            code: err.code,
            category: Some(err.category()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<crate::error::AppResult<T>> for ApiResponse<T> {
    fn from(result: crate::error::AppResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::from_error(&err),
        }
    }
}
