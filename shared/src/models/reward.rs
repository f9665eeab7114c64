//! Reward model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reward code behavior
///
/// `Unknown` absorbs kind strings this engine does not recognize so that
/// a stored document with a newer kind fails redemption with a typed
/// error instead of a deserialization fault.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RewardKind {
    /// Direct balance grant of `value`
    Choices,
    /// Record-only claim that unlocks a follow-up choice flow
    Airdrop,
    /// Requires a form payload, persisted verbatim
    Form,
    /// Requires the hidden key; may reveal a secret message
    RedemptionKey,
    #[serde(other)]
    Unknown,
}

/// Redeemable code granting balance or unlocking a flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    pub id: String,
    pub code: String,
    pub kind: RewardKind,
    /// Balance grant for `choices`; nominal value for `airdrop`
    #[serde(default)]
    pub value: i64,
    pub redemption_count: i64,
    /// 0 = unlimited
    #[serde(default)]
    pub max_redemptions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Field names expected in a `form` submission
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_fields: Vec<String>,
    /// Hidden key for `redemptionKey` rewards; never leaves the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_key: Option<String>,
    /// Public hint shown alongside a `redemptionKey` reward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_hint: Option<String>,
    /// Revealed only on successful key redemption
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reward {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn limit_reached(&self) -> bool {
        self.max_redemptions > 0 && self.redemption_count >= self.max_redemptions
    }

    /// Sanitized view safe to return from read-only checks.
    /// Must never include the hidden key or the secret message.
    pub fn sanitized(&self) -> RewardPublic {
        RewardPublic {
            code: self.code.clone(),
            kind: self.kind,
            value: self.value,
            key_hint: self.key_hint.clone(),
            form_fields: self.form_fields.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Public reward data returned by `check_code`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardPublic {
    pub code: String,
    pub kind: RewardKind,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Verbatim payload persisted for a `form` redemption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSubmission {
    pub reward_id: String,
    pub account_id: String,
    pub payload: Value,
    pub submitted_at: i64,
}
