//! Top-up store transaction engine
//!
//! Mediates in-game top-up purchases, gifting, and voucher/reward
//! redemption over an atomic document ledger. The exposed surface is
//! [`services::Storefront`]; everything underneath is the machinery:
//! the redb-backed [`store::LedgerStore`], the order/gift state machine
//! in [`orders`], the [`redemption`] engine, and the pure [`pricing`]
//! calculator.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod orders;
pub mod pricing;
pub mod redemption;
pub mod services;
pub mod store;
