//! CreateOrder action
//!
//! Creates a direct order or a gift: debits the sender, writes the order
//! document and the sender's ledger entry, and for gifts also writes the
//! recipient's `Received Gift` entry (amount 0). Product lookup happens
//! before the transaction; the balance check happens inside it against a
//! fresh read.

use crate::pricing::{apply_voucher, service_fee, MAX_ORDER_PRICE, MAX_QUANTITY, MIN_QUANTITY};
use crate::store::TxnContext;
use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CatalogProduct, EntryDetail, EntryKind, GiftEntryStatus, GiftInfo, LedgerEntry, Order,
    OrderStatus, ProductSnapshot, VoucherUse,
};
use shared::util::{new_doc_id, order_reference};

/// Gift parameters resolved by the service layer
#[derive(Debug, Clone)]
pub struct GiftSpec {
    pub recipient_id: String,
    /// Claim deadline (request value, or now + configured default window)
    pub expires_at: i64,
}

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    /// Verified paying user
    pub account_id: String,
    /// Email from the verified identity (voucher scope matching)
    pub caller_email: Option<String>,
    /// Product snapshot fetched from the catalog before the transaction
    pub product: CatalogProduct,
    pub quantity: i64,
    pub voucher_code: Option<String>,
    pub gift: Option<GiftSpec>,
    /// Opaque delivery details (non-gift orders deliver immediately)
    pub delivery: Option<Value>,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderOutcome {
    pub order: Order,
    /// Sender balance after the debit
    pub balance: i64,
}

impl CreateOrderAction {
    pub fn execute(&self, ctx: &mut TxnContext<'_>) -> AppResult<CreateOrderOutcome> {
        // 1. Product gate (the catalog result is advisory; these checks are ours)
        if !self.product.available {
            return Err(AppError::new(ErrorCode::ProductUnavailable));
        }
        if !(0..=MAX_ORDER_PRICE).contains(&self.product.price) {
            return Err(AppError::new(ErrorCode::PriceOutOfRange)
                .with_detail("price", self.product.price));
        }

        // 2. Quantity: gifts are always a single item
        let quantity = if self.gift.is_some() { 1 } else { self.quantity };
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return Err(
                AppError::new(ErrorCode::QuantityOutOfRange).with_detail("quantity", quantity)
            );
        }

        // 3. Vouchers are disallowed on gifts
        if self.gift.is_some() && self.voucher_code.is_some() {
            return Err(AppError::new(ErrorCode::VoucherOnGift));
        }

        // 4. Reads: fresh sender account (the pre-transaction balance may be stale)
        let mut sender = ctx.account_or_new(&self.account_id, self.now)?;
        if sender.email.is_none() {
            sender.email = self.caller_email.clone();
        }

        let gift_to_self = self
            .gift
            .as_ref()
            .is_some_and(|g| g.recipient_id == self.account_id);
        let mut recipient = match &self.gift {
            Some(gift) if !gift_to_self => Some(ctx.account_or_new(&gift.recipient_id, self.now)?),
            _ => None,
        };

        // 5. Voucher lookup + validation (non-gift only, enforced above)
        let fee = service_fee(self.product.price);
        let mut voucher = match &self.voucher_code {
            Some(code) => Some(
                ctx.voucher_by_code(code)?
                    .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?,
            ),
            None => None,
        };
        let deduction = match &voucher {
            Some(v) => apply_voucher(
                v,
                self.product.price,
                quantity,
                fee,
                &sender,
                self.caller_email.as_deref(),
                self.now,
            )?,
            None => 0,
        };

        // 6. Totals and the in-transaction balance check
        let snapshot = ProductSnapshot::from((&self.product, quantity));
        let total = snapshot.subtotal() + fee - deduction;
        if sender.balance < total {
            return Err(AppError::insufficient_balance(sender.balance, total));
        }

        // ---- writes from here on ----

        // 7. Order document
        let order_count = ctx.next_order_count()?;
        let reference = order_reference(order_count);
        let status = if self.gift.is_some() {
            OrderStatus::SentGift
        } else {
            OrderStatus::Pending
        };
        let order = Order {
            id: new_doc_id(),
            account_id: self.account_id.clone(),
            reference: reference.clone(),
            product: snapshot.clone(),
            fee,
            voucher: voucher.as_ref().map(|v| VoucherUse {
                voucher_id: v.id.clone(),
                code: v.code.clone(),
                deduction,
            }),
            final_amount_paid: total,
            status,
            gift: self.gift.as_ref().map(|g| GiftInfo {
                recipient_id: g.recipient_id.clone(),
                sender_name: sender.display_name.clone(),
                expires_at: g.expires_at,
                claimed_by: None,
                claimed_at: None,
                refunded_by: None,
                refunded_at: None,
            }),
            delivery: self.delivery.clone(),
            created_at: self.now,
            updated_at: self.now,
        };

        // 8. Sender debit + ledger entry
        let sender_kind = if self.gift.is_some() {
            EntryKind::Gifted
        } else {
            EntryKind::Order
        };
        sender.balance -= total;
        sender.order_count += 1;
        sender.record_entry(sender_kind, self.now);

        let sender_detail = match &self.gift {
            Some(gift) => EntryDetail::Gifted {
                product_name: snapshot.name.clone(),
                recipient_id: gift.recipient_id.clone(),
                recipient_name: recipient
                    .as_ref()
                    .and_then(|r| r.display_name.clone()),
                status: GiftEntryStatus::Pending,
            },
            None => EntryDetail::Order {
                product_name: snapshot.name.clone(),
                quantity,
                gift_claim: false,
                delivery: self.delivery.clone(),
            },
        };
        let sender_entry = LedgerEntry::new(
            new_doc_id(),
            &self.account_id,
            ctx.next_entry_seq()?,
            -total,
            &reference,
            Some(order.id.clone()),
            sender_detail,
            self.now,
        );

        // 9. Recipient side of a gift: amount-0 entry + counters
        let recipient_entry = match &self.gift {
            Some(gift) => {
                let target = if gift_to_self {
                    &mut sender
                } else {
                    recipient
                        .as_mut()
                        .ok_or_else(|| AppError::internal("recipient account was not read"))?
                };
                target.gift_received_count += 1;
                target.record_entry(EntryKind::ReceivedGift, self.now);
                Some(LedgerEntry::new(
                    new_doc_id(),
                    &gift.recipient_id,
                    ctx.next_entry_seq()?,
                    0,
                    &reference,
                    Some(order.id.clone()),
                    EntryDetail::ReceivedGift {
                        product_name: snapshot.name.clone(),
                        sender_id: self.account_id.clone(),
                        sender_name: sender.display_name.clone(),
                        status: GiftEntryStatus::Pending,
                    },
                    self.now,
                ))
            }
            None => None,
        };

        // 10. Voucher redemption counts only for non-gift orders
        if let Some(v) = voucher.as_mut() {
            v.redemption_count += 1;
            v.updated_at = self.now;
            sender.redeemed_voucher_ids.insert(v.id.clone());
            ctx.put_voucher(v)?;
        }

        ctx.put_order(&order)?;
        ctx.put_account(&sender)?;
        if let Some(recipient) = &recipient {
            ctx.put_account(recipient)?;
        }
        ctx.put_entry(&sender_entry)?;
        if let Some(entry) = &recipient_entry {
            ctx.put_entry(entry)?;
        }

        tracing::info!(
            order_id = %order.id,
            reference = %order.reference,
            account_id = %self.account_id,
            gift = self.gift.is_some(),
            total,
            "order created"
        );

        Ok(CreateOrderOutcome {
            balance: sender.balance,
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LedgerStore;
    use shared::models::{Voucher, VoucherType};
    use shared::util::now_millis;

    fn seed_account(store: &LedgerStore, id: &str, balance: i64) {
        store
            .run_atomic(|txn| {
                let mut account = txn.account_or_new(id, now_millis())?;
                account.balance = balance;
                txn.put_account(&account)?;
                Ok(())
            })
            .unwrap();
    }

    fn seed_voucher(store: &LedgerStore, voucher: &Voucher) {
        store
            .run_atomic(|txn| {
                txn.put_voucher(voucher)?;
                Ok(())
            })
            .unwrap();
    }

    fn product(price: i64) -> CatalogProduct {
        CatalogProduct {
            id: "diamonds-100".into(),
            name: "100 Diamonds".into(),
            group: Some("Diamonds".into()),
            price,
            available: true,
        }
    }

    fn action(store_product: CatalogProduct, quantity: i64) -> CreateOrderAction {
        CreateOrderAction {
            account_id: "sender".into(),
            caller_email: None,
            product: store_product,
            quantity,
            voucher_code: None,
            gift: None,
            delivery: None,
            now: now_millis(),
        }
    }

    fn run(store: &LedgerStore, action: &CreateOrderAction) -> AppResult<CreateOrderOutcome> {
        store.run_atomic(|txn| action.execute(txn))
    }

    #[test]
    fn direct_order_debits_subtotal_plus_fee() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        // price 1000, qty 2 → subtotal 2000, fee 500, total 2500
        let outcome = run(&store, &action(product(1_000), 2)).unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Pending);
        assert_eq!(outcome.order.fee, 500);
        assert_eq!(outcome.order.final_amount_paid, 2_500);
        assert_eq!(outcome.order.reference, "ORD-000001");
        assert_eq!(outcome.balance, 7_500);

        let account = store.get_account("sender").unwrap().unwrap();
        assert_eq!(account.balance, 7_500);
        assert_eq!(account.order_count, 1);
        assert_eq!(account.transaction_count, 1);
        assert!(account.first_transaction_at.is_some());

        let entries = store.entries_for_account("sender", None, 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, -2_500);
        assert_eq!(entries[0].kind(), EntryKind::Order);
        assert_eq!(
            entries[0].related_doc_id.as_deref(),
            Some(outcome.order.id.as_str())
        );
    }

    #[test]
    fn insufficient_balance_leaves_no_trace() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 100);

        let err = run(&store, &action(product(1_000), 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientBalance);

        let account = store.get_account("sender").unwrap().unwrap();
        assert_eq!(account.balance, 100);
        assert_eq!(account.order_count, 0);
        assert!(store.entries_for_account("sender", None, 10).unwrap().is_empty());
        assert_eq!(store.order_count().unwrap(), 0);
    }

    #[test]
    fn gift_creates_both_sides_and_forces_quantity_one() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        let mut a = action(product(1_000), 5);
        a.gift = Some(GiftSpec {
            recipient_id: "recipient".into(),
            expires_at: a.now + 86_400_000,
        });
        let outcome = run(&store, &a).unwrap();

        assert_eq!(outcome.order.status, OrderStatus::SentGift);
        assert_eq!(outcome.order.product.quantity, 1);
        // subtotal 1000 + fee 500
        assert_eq!(outcome.order.final_amount_paid, 1_500);

        let sender_entries = store.entries_for_account("sender", None, 10).unwrap();
        assert_eq!(sender_entries.len(), 1);
        assert_eq!(sender_entries[0].kind(), EntryKind::Gifted);
        assert_eq!(sender_entries[0].amount, -1_500);

        let recipient = store.get_account("recipient").unwrap().unwrap();
        assert_eq!(recipient.balance, 0);
        assert_eq!(recipient.gift_received_count, 1);
        assert_eq!(recipient.transaction_count, 1);

        let recipient_entries = store.entries_for_account("recipient", None, 10).unwrap();
        assert_eq!(recipient_entries.len(), 1);
        assert_eq!(recipient_entries[0].kind(), EntryKind::ReceivedGift);
        assert_eq!(recipient_entries[0].amount, 0);
    }

    #[test]
    fn voucher_on_gift_is_rejected() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        let mut a = action(product(1_000), 1);
        a.gift = Some(GiftSpec {
            recipient_id: "recipient".into(),
            expires_at: a.now + 86_400_000,
        });
        a.voucher_code = Some("SAVE100".into());

        let err = run(&store, &a).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherOnGift);
    }

    #[test]
    fn voucher_deducts_and_is_single_use_per_user() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);
        seed_voucher(
            &store,
            &Voucher {
                id: "v1".into(),
                code: "SAVE100".into(),
                voucher_type: VoucherType::Discount,
                amount: 100,
                orders_amount: None,
                valid_price: None,
                valid_fee: None,
                privacy: None,
                redemption_count: 0,
                max_redemptions: 0,
                expires_at: None,
                created_at: 0,
                updated_at: 0,
            },
        );

        let mut a = action(product(1_000), 1);
        // Lookup is case-insensitive
        a.voucher_code = Some("save100".into());
        let outcome = run(&store, &a).unwrap();

        // subtotal 1000 + fee 500 - 100
        assert_eq!(outcome.order.final_amount_paid, 1_400);
        assert_eq!(outcome.order.voucher.as_ref().unwrap().deduction, 100);

        let voucher = store.get_voucher("SAVE100").unwrap().unwrap();
        assert_eq!(voucher.redemption_count, 1);

        // Second use by the same user fails and increments nothing
        let err = run(&store, &a).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherAlreadyRedeemed);
        let voucher = store.get_voucher("SAVE100").unwrap().unwrap();
        assert_eq!(voucher.redemption_count, 1);
    }

    #[test]
    fn unknown_voucher_code_fails() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        let mut a = action(product(1_000), 1);
        a.voucher_code = Some("NOPE".into());
        let err = run(&store, &a).unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherNotFound);
    }

    #[test]
    fn unavailable_product_is_rejected() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        let mut p = product(1_000);
        p.available = false;
        let err = run(&store, &action(p, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductUnavailable);
    }

    #[test]
    fn price_and_quantity_bounds_are_enforced() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000_000);

        let err = run(&store, &action(product(500_001), 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceOutOfRange);

        let err = run(&store, &action(product(-5), 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceOutOfRange);

        let err = run(&store, &action(product(1_000), 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::QuantityOutOfRange);

        let err = run(&store, &action(product(1_000), 6)).unwrap_err();
        assert_eq!(err.code, ErrorCode::QuantityOutOfRange);
    }

    #[test]
    fn zero_price_order_is_allowed() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 0);

        let outcome = run(&store, &action(product(0), 1)).unwrap();
        assert_eq!(outcome.order.final_amount_paid, 0);
        assert_eq!(outcome.balance, 0);
    }

    #[test]
    fn gift_to_self_keeps_one_consistent_account() {
        let store = LedgerStore::open_in_memory().unwrap();
        seed_account(&store, "sender", 10_000);

        let mut a = action(product(1_000), 1);
        a.gift = Some(GiftSpec {
            recipient_id: "sender".into(),
            expires_at: a.now + 86_400_000,
        });
        run(&store, &a).unwrap();

        let account = store.get_account("sender").unwrap().unwrap();
        assert_eq!(account.balance, 8_500);
        assert_eq!(account.order_count, 1);
        assert_eq!(account.gift_received_count, 1);
        assert_eq!(account.transaction_count, 2);

        let entries = store.entries_for_account("sender", None, 10).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
