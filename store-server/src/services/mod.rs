//! Storefront service facade
//!
//! The exposed operation surface. Each operation verifies the caller's
//! token, performs collaborator I/O (catalog lookups) *before* the store
//! transaction, then runs the action atomically. Collaborator results
//! are advisory; anything that affects an invariant is re-validated
//! inside the transaction.

use crate::accounts::{self, TransferAction, TransferOutcome};
use crate::auth::{Identity, IdentityProvider};
use crate::catalog::ProductCatalog;
use crate::core::Config;
use crate::orders::{
    ClaimGiftAction, ClaimGiftOutcome, CreateOrderAction, CreateOrderOutcome,
    FinalizeDeliveryAction, FinalizeDeliveryOutcome, GiftSpec, RefundGiftAction, RefundGiftOutcome,
};
use crate::pricing::{apply_voucher, service_fee};
use crate::redemption::{self, RedeemCodeAction, RedeemOutcome};
use crate::store::LedgerStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, EntryKind, LedgerEntry, RewardPublic};
use shared::util::now_millis;
use std::sync::Arc;
use validator::Validate;

const HOUR_MS: i64 = 3_600_000;

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[validate(length(min = 1, max = 32))]
    pub voucher_code: Option<String>,
    #[validate(nested)]
    pub gift: Option<GiftRequest>,
    pub delivery: Option<Value>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GiftRequest {
    #[validate(length(min = 1, max = 64))]
    pub recipient_id: String,
    /// Absolute claim deadline; omitted → now + configured window
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClaimGiftRequest {
    #[validate(length(min = 1, max = 64))]
    pub order_id: String,
    pub delivery: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefundGiftRequest {
    #[validate(length(min = 1, max = 64))]
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinalizeDeliveryRequest {
    #[validate(length(min = 1, max = 64))]
    pub order_id: String,
    pub delivery: Value,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RedeemCodeRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckVoucherRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransferRequest {
    #[validate(length(min = 1, max = 64))]
    pub recipient_id: String,
    #[validate(range(min = 1))]
    pub amount: i64,
}

/// Read-only voucher eligibility quote
#[derive(Debug, Clone, Serialize)]
pub struct VoucherQuote {
    pub code: String,
    pub subtotal: i64,
    pub fee: i64,
    pub deduction: i64,
    /// What the order would cost with this voucher applied
    pub total: i64,
}

// ============================================================================
// Facade
// ============================================================================

/// The storefront's exposed operation surface
#[derive(Clone)]
pub struct Storefront {
    config: Config,
    store: LedgerStore,
    catalog: Arc<dyn ProductCatalog>,
    identity: Arc<dyn IdentityProvider>,
}

impl Storefront {
    pub fn new(
        config: Config,
        store: LedgerStore,
        catalog: Arc<dyn ProductCatalog>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            store,
            catalog,
            identity,
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    async fn authenticate(&self, token: &str) -> AppResult<Identity> {
        self.identity.verify_token(token).await
    }

    fn validate<R: Validate>(req: &R) -> AppResult<()> {
        req.validate()
            .map_err(|e| AppError::validation(e.to_string()))
    }

    /// Create a direct order or a gift
    pub async fn create_order(
        &self,
        token: &str,
        req: CreateOrderRequest,
    ) -> AppResult<CreateOrderOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        // Catalog I/O stays outside the transaction
        let product = self
            .catalog
            .fetch_product(&req.product_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

        let now = now_millis();
        let gift = req.gift.map(|g| GiftSpec {
            recipient_id: g.recipient_id,
            expires_at: g
                .expires_at
                .unwrap_or(now + self.config.gift_expiration_hours * HOUR_MS),
        });
        let action = CreateOrderAction {
            account_id: identity.user_id,
            caller_email: identity.email,
            product,
            quantity: req.quantity,
            voucher_code: req.voucher_code,
            gift,
            delivery: req.delivery,
            now,
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// Claim a gift as its designated recipient
    pub async fn claim_gift(
        &self,
        token: &str,
        req: ClaimGiftRequest,
    ) -> AppResult<ClaimGiftOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let action = ClaimGiftAction {
            order_id: req.order_id,
            claimer_id: identity.user_id,
            delivery: req.delivery,
            now: now_millis(),
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// Update delivery details after a claim
    pub async fn finalize_gift_delivery(
        &self,
        token: &str,
        req: FinalizeDeliveryRequest,
    ) -> AppResult<FinalizeDeliveryOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let action = FinalizeDeliveryAction {
            order_id: req.order_id,
            caller_id: identity.user_id,
            delivery: req.delivery,
            now: now_millis(),
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// Refund an expired, unclaimed gift to its sender
    pub async fn refund_expired_gift(
        &self,
        token: &str,
        req: RefundGiftRequest,
    ) -> AppResult<RefundGiftOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let action = RefundGiftAction {
            order_id: req.order_id,
            caller_id: identity.user_id,
            now: now_millis(),
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// Read-only reward code check (sanitized)
    pub async fn check_redemption_code(&self, token: &str, code: &str) -> AppResult<RewardPublic> {
        let identity = self.authenticate(token).await?;
        redemption::check_code(&self.store, code, &identity.user_id, now_millis())
    }

    /// Redeem a reward code
    pub async fn redeem_code(
        &self,
        token: &str,
        req: RedeemCodeRequest,
    ) -> AppResult<RedeemOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let action = RedeemCodeAction {
            code: req.code,
            account_id: identity.user_id,
            payload: req.payload,
            now: now_millis(),
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// Read-only voucher eligibility check against an intended purchase
    pub async fn check_voucher(
        &self,
        token: &str,
        req: CheckVoucherRequest,
    ) -> AppResult<VoucherQuote> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let product = self
            .catalog
            .fetch_product(&req.product_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        let voucher = self
            .store
            .get_voucher(&req.code)?
            .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?;

        let now = now_millis();
        let account = accounts::get_account(&self.store, &identity.user_id, now)?;
        let fee = service_fee(product.price);
        let deduction = apply_voucher(
            &voucher,
            product.price,
            req.quantity,
            fee,
            &account,
            identity.email.as_deref(),
            now,
        )?;
        let subtotal = product.price * req.quantity;
        Ok(VoucherQuote {
            code: voucher.code,
            subtotal,
            fee,
            deduction,
            total: subtotal + fee - deduction,
        })
    }

    /// Transfer balance to another user
    pub async fn transfer(&self, token: &str, req: TransferRequest) -> AppResult<TransferOutcome> {
        let identity = self.authenticate(token).await?;
        Self::validate(&req)?;

        let action = TransferAction {
            sender_id: identity.user_id,
            recipient_id: req.recipient_id,
            amount: req.amount,
            now: now_millis(),
        };
        self.store.run_atomic(|txn| action.execute(txn))
    }

    /// The caller's account view
    pub async fn get_account(&self, token: &str) -> AppResult<Account> {
        let identity = self.authenticate(token).await?;
        accounts::get_account(&self.store, &identity.user_id, now_millis())
    }

    /// The caller's transaction history, newest first
    pub async fn list_transactions(
        &self,
        token: &str,
        kind: Option<EntryKind>,
        limit: Option<usize>,
    ) -> AppResult<Vec<LedgerEntry>> {
        let identity = self.authenticate(token).await?;
        accounts::list_transactions(
            &self.store,
            &identity.user_id,
            kind,
            limit.unwrap_or(self.config.history_page_size),
        )
    }
}
