//! Reward code validation and redemption

use crate::store::{LedgerStore, TxnContext};
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    EntryDetail, EntryKind, FormSubmission, LedgerEntry, Reward, RewardKind, RewardPublic,
};
use shared::util::new_doc_id;

/// Ledger kinds that mark a reward as already claimed by a user.
///
/// `choices` redemptions are recorded as `Receive` (they credit balance);
/// every other kind records a `Redeemed` entry. The check and the
/// redemption must use the same set or idempotent-reject breaks.
pub fn claimed_kinds(kind: RewardKind) -> &'static [EntryKind] {
    match kind {
        RewardKind::Choices => &[EntryKind::Receive],
        _ => &[EntryKind::Redeemed],
    }
}

fn validate_reward(reward: &Reward, now: i64) -> AppResult<()> {
    if reward.kind == RewardKind::Unknown {
        return Err(AppError::new(ErrorCode::UnsupportedRewardType));
    }
    if reward.is_expired(now) {
        return Err(AppError::new(ErrorCode::RewardExpired));
    }
    if reward.limit_reached() {
        return Err(AppError::new(ErrorCode::RewardLimitReached));
    }
    Ok(())
}

/// Read-only code check: validates the code for this user and returns the
/// sanitized reward data. Never reveals the redemption key or the secret
/// message, and never mutates anything.
pub fn check_code(
    store: &LedgerStore,
    code: &str,
    account_id: &str,
    now: i64,
) -> AppResult<RewardPublic> {
    let reward = store
        .get_reward(code)?
        .ok_or_else(|| AppError::new(ErrorCode::RewardNotFound))?;
    validate_reward(&reward, now)?;

    let prior = store.find_entry(account_id, &reward.id, claimed_kinds(reward.kind))?;
    if prior.is_some() {
        return Err(AppError::new(ErrorCode::RewardAlreadyRedeemed));
    }

    Ok(reward.sanitized())
}

/// What a successful redemption unlocked
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RedeemOutcome {
    /// `choices`: balance was credited
    Credited { value: i64, balance: i64 },
    /// `airdrop`: proceed to the follow-up choice flow with this value
    AirdropUnlocked { value: i64 },
    /// `form`: submission stored
    FormRecorded,
    /// `redemptionKey`: key matched
    KeyAccepted {
        #[serde(skip_serializing_if = "Option::is_none")]
        secret_message: Option<String>,
    },
}

/// RedeemCode action
///
/// Re-validates everything `check_code` checked: the gap between an
/// earlier check and this transaction is real, requests are independent.
#[derive(Debug, Clone)]
pub struct RedeemCodeAction {
    pub code: String,
    /// Verified caller
    pub account_id: String,
    /// Form payload or redemption key, depending on the reward kind
    pub payload: Option<Value>,
    pub now: i64,
}

impl RedeemCodeAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<RedeemOutcome> {
        // 1. Fresh reads of everything the decision depends on
        let mut reward = ctx
            .reward_by_code(&self.code)?
            .ok_or_else(|| AppError::new(ErrorCode::RewardNotFound))?;
        validate_reward(&reward, self.now)?;

        let mut account = ctx.account_or_new(&self.account_id, self.now)?;
        let prior = ctx.find_entry(&self.account_id, &reward.id, claimed_kinds(reward.kind))?;
        if prior.is_some() {
            return Err(AppError::new(ErrorCode::RewardAlreadyRedeemed));
        }

        // 2. Branch by kind: decide amount, entry detail, submission, outcome
        let (amount, detail, submission, outcome) = match reward.kind {
            RewardKind::Choices => (
                reward.value,
                EntryDetail::Receive {
                    reward_name: Some(reward.code.clone()),
                    sender_id: None,
                },
                None,
                RedeemOutcome::Credited {
                    value: reward.value,
                    balance: account.balance + reward.value,
                },
            ),
            RewardKind::Airdrop => (
                0,
                EntryDetail::Redeemed {
                    reward_kind: reward.kind,
                },
                None,
                RedeemOutcome::AirdropUnlocked {
                    value: reward.value,
                },
            ),
            RewardKind::Form => {
                let payload = self
                    .payload
                    .clone()
                    .ok_or_else(|| AppError::new(ErrorCode::PayloadRequired))?;
                (
                    0,
                    EntryDetail::Redeemed {
                        reward_kind: reward.kind,
                    },
                    Some(FormSubmission {
                        reward_id: reward.id.clone(),
                        account_id: self.account_id.clone(),
                        payload,
                        submitted_at: self.now,
                    }),
                    RedeemOutcome::FormRecorded,
                )
            }
            RewardKind::RedemptionKey => {
                let submitted = self
                    .payload
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| AppError::new(ErrorCode::PayloadRequired))?;
                let expected = reward.redemption_key.as_deref().ok_or_else(|| {
                    AppError::internal("redemptionKey reward has no key configured")
                })?;
                if submitted != expected {
                    return Err(AppError::new(ErrorCode::WrongRedemptionKey));
                }
                (
                    0,
                    EntryDetail::Redeemed {
                        reward_kind: reward.kind,
                    },
                    None,
                    RedeemOutcome::KeyAccepted {
                        secret_message: reward.secret_message.clone(),
                    },
                )
            }
            RewardKind::Unknown => {
                return Err(AppError::new(ErrorCode::UnsupportedRewardType));
            }
        };

        // ---- writes from here on ----

        // 3. Exactly one ledger entry, counter bumps on both documents
        reward.redemption_count += 1;
        reward.updated_at = self.now;

        account.balance += amount;
        account.record_entry(detail.kind(), self.now);

        let entry = LedgerEntry::new(
            new_doc_id(),
            &self.account_id,
            ctx.next_entry_seq()?,
            amount,
            &reward.code,
            Some(reward.id.clone()),
            detail,
            self.now,
        );

        ctx.put_reward(&reward)?;
        ctx.put_account(&account)?;
        ctx.put_entry(&entry)?;
        if let Some(submission) = &submission {
            ctx.put_submission(submission)?;
        }

        tracing::info!(
            code = %reward.code,
            account_id = %self.account_id,
            kind = ?reward.kind,
            amount,
            "reward redeemed"
        );

        Ok(outcome)
    }
}
