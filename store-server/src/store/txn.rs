//! Atomic transaction context
//!
//! Wraps a redb write transaction and enforces the store's contract:
//! within one transaction, every document read must happen before the
//! first write. Actions do all their validation reads up front, decide,
//! then stage writes; a read after a write is an engine bug and fails
//! the transaction.

use super::{
    ACCOUNTS_TABLE, COUNTERS_TABLE, ENTRIES_TABLE, ENTRY_SEQ_KEY, ORDERS_TABLE, ORDER_COUNT_KEY,
    REWARDS_TABLE, SUBMISSIONS_TABLE, StoreError, StoreResult, VOUCHERS_TABLE,
};
use redb::{ReadableTable, WriteTransaction};
use shared::models::{Account, EntryKind, FormSubmission, LedgerEntry, Order, Reward, Voucher};

/// Read-then-write context handed to `run_atomic` closures
pub struct TxnContext<'a> {
    txn: &'a WriteTransaction,
    wrote: bool,
}

impl<'a> TxnContext<'a> {
    pub(super) fn new(txn: &'a WriteTransaction) -> Self {
        Self { txn, wrote: false }
    }

    fn guard_read(&self, what: &'static str) -> StoreResult<()> {
        if self.wrote {
            return Err(StoreError::ReadAfterWrite(what));
        }
        Ok(())
    }

    // ========== Reads (must precede all writes) ==========

    /// Load an account
    pub fn account(&self, account_id: &str) -> StoreResult<Option<Account>> {
        self.guard_read("account")?;
        let table = self.txn.open_table(ACCOUNTS_TABLE)?;
        match table.get(account_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an account, or a fresh zero-balance one if it does not exist
    /// yet. The caller decides whether to persist it.
    pub fn account_or_new(&self, account_id: &str, now: i64) -> StoreResult<Account> {
        Ok(self
            .account(account_id)?
            .unwrap_or_else(|| Account::new(account_id, now)))
    }

    /// Load an order
    pub fn order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.guard_read("order")?;
        let table = self.txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a voucher by code (case-insensitive)
    pub fn voucher_by_code(&self, code: &str) -> StoreResult<Option<Voucher>> {
        self.guard_read("voucher")?;
        let table = self.txn.open_table(VOUCHERS_TABLE)?;
        match table.get(code.to_uppercase().as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a reward by code (exact match)
    pub fn reward_by_code(&self, code: &str) -> StoreResult<Option<Reward>> {
        self.guard_read("reward")?;
        let table = self.txn.open_table(REWARDS_TABLE)?;
        match table.get(code)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Find an account's entry by `(related_doc_id, kind)`
    pub fn find_entry(
        &self,
        account_id: &str,
        related_doc_id: &str,
        kinds: &[EntryKind],
    ) -> StoreResult<Option<LedgerEntry>> {
        self.guard_read("ledger entry")?;
        let table = self.txn.open_table(ENTRIES_TABLE)?;
        let range_start = (account_id, 0u64);
        let range_end = (account_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entry: LedgerEntry = serde_json::from_slice(value.value())?;
            if entry.related_doc_id.as_deref() == Some(related_doc_id)
                && kinds.contains(&entry.kind())
            {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    // ========== Writes ==========

    /// Allocate the next store-wide ledger entry sequence number.
    /// Counts as a write: call only after all validation reads are done.
    pub fn next_entry_seq(&mut self) -> StoreResult<u64> {
        self.wrote = true;
        let mut table = self.txn.open_table(COUNTERS_TABLE)?;
        let next = table.get(ENTRY_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(ENTRY_SEQ_KEY, next)?;
        Ok(next)
    }

    /// Allocate the next order count (drives the human-facing reference).
    /// Counts as a write.
    pub fn next_order_count(&mut self) -> StoreResult<u64> {
        self.wrote = true;
        let mut table = self.txn.open_table(COUNTERS_TABLE)?;
        let next = table.get(ORDER_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(ORDER_COUNT_KEY, next)?;
        Ok(next)
    }

    /// Upsert an account
    pub fn put_account(&mut self, account: &Account) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(ACCOUNTS_TABLE)?;
        let value = serde_json::to_vec(account)?;
        table.insert(account.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Upsert an order
    pub fn put_order(&mut self, order: &Order) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Insert (or status-patch) a ledger entry under `(account_id, seq)`
    pub fn put_entry(&mut self, entry: &LedgerEntry) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(ENTRIES_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert((entry.account_id.as_str(), entry.seq), value.as_slice())?;
        Ok(())
    }

    /// Upsert a voucher (redemption count bump)
    pub fn put_voucher(&mut self, voucher: &Voucher) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(VOUCHERS_TABLE)?;
        let value = serde_json::to_vec(voucher)?;
        table.insert(voucher.code.to_uppercase().as_str(), value.as_slice())?;
        Ok(())
    }

    /// Upsert a reward (redemption count bump)
    pub fn put_reward(&mut self, reward: &Reward) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(REWARDS_TABLE)?;
        let value = serde_json::to_vec(reward)?;
        table.insert(reward.code.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Persist a form submission
    pub fn put_submission(&mut self, submission: &FormSubmission) -> StoreResult<()> {
        self.wrote = true;
        let mut table = self.txn.open_table(SUBMISSIONS_TABLE)?;
        let value = serde_json::to_vec(submission)?;
        table.insert(
            (submission.reward_id.as_str(), submission.account_id.as_str()),
            value.as_slice(),
        )?;
        Ok(())
    }
}
