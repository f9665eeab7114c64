//! Account operations: balance transfers and history views
//!
//! Transfers produce the `Sent`/`Receive` entry pair; the read views
//! back the storefront's balance and history screens.

use crate::store::{LedgerStore, TxnContext};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, EntryDetail, EntryKind, LedgerEntry};
use shared::util::new_doc_id;

/// Transfer balance between two accounts
#[derive(Debug, Clone)]
pub struct TransferAction {
    /// Verified caller
    pub sender_id: String,
    pub recipient_id: String,
    pub amount: i64,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    /// Sender balance after the debit
    pub balance: i64,
    pub reference: String,
}

impl TransferAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<TransferOutcome> {
        if self.amount <= 0 {
            return Err(AppError::validation("Transfer amount must be positive"));
        }
        if self.sender_id == self.recipient_id {
            return Err(AppError::new(ErrorCode::TransferToSelf));
        }

        // Reads: both sides, fresh
        let mut sender = ctx.account_or_new(&self.sender_id, self.now)?;
        let mut recipient = ctx.account_or_new(&self.recipient_id, self.now)?;

        if sender.balance < self.amount {
            return Err(AppError::insufficient_balance(sender.balance, self.amount));
        }

        // ---- writes from here on ----

        sender.balance -= self.amount;
        sender.record_entry(EntryKind::Sent, self.now);
        recipient.balance += self.amount;
        recipient.record_entry(EntryKind::Receive, self.now);

        let sent_seq = ctx.next_entry_seq()?;
        let reference = format!("TRF-{sent_seq:06}");
        let sent_entry = LedgerEntry::new(
            new_doc_id(),
            &self.sender_id,
            sent_seq,
            -self.amount,
            &reference,
            None,
            EntryDetail::Sent {
                recipient_id: self.recipient_id.clone(),
            },
            self.now,
        );
        let receive_entry = LedgerEntry::new(
            new_doc_id(),
            &self.recipient_id,
            ctx.next_entry_seq()?,
            self.amount,
            &reference,
            None,
            EntryDetail::Receive {
                reward_name: None,
                sender_id: Some(self.sender_id.clone()),
            },
            self.now,
        );

        ctx.put_account(&sender)?;
        ctx.put_account(&recipient)?;
        ctx.put_entry(&sent_entry)?;
        ctx.put_entry(&receive_entry)?;

        tracing::info!(
            sender_id = %self.sender_id,
            recipient_id = %self.recipient_id,
            amount = self.amount,
            reference = %reference,
            "balance transferred"
        );

        Ok(TransferOutcome {
            balance: sender.balance,
            reference,
        })
    }
}

/// Load an account view (missing account reads as a fresh zero-balance one)
pub fn get_account(store: &LedgerStore, account_id: &str, now: i64) -> AppResult<Account> {
    Ok(store
        .get_account(account_id)?
        .unwrap_or_else(|| Account::new(account_id, now)))
}

/// Transaction history, newest first
pub fn list_transactions(
    store: &LedgerStore,
    account_id: &str,
    kind: Option<EntryKind>,
    limit: usize,
) -> AppResult<Vec<LedgerEntry>> {
    Ok(store.entries_for_account(account_id, kind, limit)?)
}
