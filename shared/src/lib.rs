//! Shared types for the top-up store backend
//!
//! Domain models, the unified error system, response structures, and
//! small utilities used by the store engine.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::ApiResponse;
