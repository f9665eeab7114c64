//! redb-based ledger store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `accounts` | `account_id` | `Account` | Mutable balance aggregates |
//! | `orders` | `order_id` | `Order` | Order documents |
//! | `ledger_entries` | `(account_id, seq)` | `LedgerEntry` | Append-only ledger |
//! | `vouchers` | uppercased code | `Voucher` | Discount rules |
//! | `rewards` | code | `Reward` | Redeemable codes |
//! | `form_submissions` | `(reward_id, account_id)` | `FormSubmission` | Form payloads |
//! | `counters` | `()` keys | `u64` | Entry sequence + order count |
//!
//! All values are JSON-serialized documents.
//!
//! # Transaction discipline
//!
//! [`LedgerStore::run_atomic`] is the only way to mutate documents. The
//! write transaction it hands out enforces the read-before-write rule:
//! once the first write is staged, further document reads in that
//! transaction fail. Either the whole closure commits or none of it is
//! visible. redb write transactions are serializable (single writer),
//! so re-validation inside the transaction is authoritative.

mod txn;

pub use txn::TxnContext;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::error::{AppError, ErrorCode};
use shared::models::{Account, EntryKind, FormSubmission, LedgerEntry, Order, Reward, Voucher};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub(crate) const ACCOUNTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");
pub(crate) const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");
pub(crate) const ENTRIES_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("ledger_entries");
pub(crate) const VOUCHERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("vouchers");
pub(crate) const REWARDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("rewards");
pub(crate) const SUBMISSIONS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("form_submissions");
pub(crate) const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

pub(crate) const ENTRY_SEQ_KEY: &str = "entry_seq";
pub(crate) const ORDER_COUNT_KEY: &str = "order_count";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("read of {0} after first write: all reads must precede writes in a transaction")]
    ReadAfterWrite(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Commit(_) | StoreError::Transaction(_) => ErrorCode::StoreConflict,
            StoreError::Serialization(_) => ErrorCode::SerializationError,
            StoreError::ReadAfterWrite(_) => ErrorCode::InternalError,
            _ => ErrorCode::StoreError,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Ledger store backed by redb
#[derive(Clone)]
pub struct LedgerStore {
    db: Arc<Database>,
}

impl LedgerStore {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns
    /// the transaction is persistent, and the file is always left in a
    /// consistent state (copy-on-write with atomic pointer swap).
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        tracing::info!("ledger store opened");
        Ok(store)
    }

    /// Open an in-memory database (tests and ephemeral dev runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
            let _ = write_txn.open_table(VOUCHERS_TABLE)?;
            let _ = write_txn.open_table(REWARDS_TABLE)?;
            let _ = write_txn.open_table(SUBMISSIONS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ENTRY_SEQ_KEY)?.is_none() {
                counters.insert(ENTRY_SEQ_KEY, 0u64)?;
            }
            if counters.get(ORDER_COUNT_KEY)?.is_none() {
                counters.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Run one atomic read-then-write transaction.
    ///
    /// The closure receives a [`TxnContext`]; every read must happen
    /// before the first write (the context enforces this). If the closure
    /// returns `Err`, the transaction is aborted and none of its writes
    /// become visible. If it returns `Ok`, the commit makes all of them
    /// visible at once.
    pub fn run_atomic<T>(
        &self,
        f: impl FnOnce(&mut TxnContext<'_>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let mut ctx = TxnContext::new(&write_txn);
        match f(&mut ctx) {
            Ok(value) => {
                drop(ctx);
                write_txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                drop(ctx);
                // Abort failure is secondary; the original error wins
                if let Err(abort_err) = write_txn.abort() {
                    tracing::error!(error = %abort_err, "failed to abort store transaction");
                }
                Err(err)
            }
        }
    }

    // ========== Read-only views ==========

    /// Load an account
    pub fn get_account(&self, account_id: &str) -> StoreResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS_TABLE)?;
        match table.get(account_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a voucher by code (case-insensitive)
    pub fn get_voucher(&self, code: &str) -> StoreResult<Option<Voucher>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VOUCHERS_TABLE)?;
        match table.get(code.to_uppercase().as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a reward by code (exact match)
    pub fn get_reward(&self, code: &str) -> StoreResult<Option<Reward>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REWARDS_TABLE)?;
        match table.get(code)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All ledger entries for an account, newest first
    pub fn entries_for_account(
        &self,
        account_id: &str,
        kind: Option<EntryKind>,
        limit: usize,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

        let range_start = (account_id, 0u64);
        let range_end = (account_id, u64::MAX);
        let mut entries = Vec::new();
        for result in table.range(range_start..=range_end)?.rev() {
            let (_key, value) = result?;
            let entry: LedgerEntry = serde_json::from_slice(value.value())?;
            if kind.is_some_and(|k| entry.kind() != k) {
                continue;
            }
            entries.push(entry);
            if entries.len() >= limit {
                break;
            }
        }
        Ok(entries)
    }

    /// Find an account's entry by `(related_doc_id, kind)`: the gift
    /// counterpart / prior-redemption lookup
    pub fn find_entry(
        &self,
        account_id: &str,
        related_doc_id: &str,
        kinds: &[EntryKind],
    ) -> StoreResult<Option<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;

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

    /// Load a form submission
    pub fn get_submission(
        &self,
        reward_id: &str,
        account_id: &str,
    ) -> StoreResult<Option<FormSubmission>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUBMISSIONS_TABLE)?;
        match table.get((reward_id, account_id))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Current order count (read-only)
    pub fn order_count(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(ORDER_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0))
    }
}
