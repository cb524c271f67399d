//! Core trip ledger logic for Tripsplit.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and email delivery are consumed through the [`store::LedgerStore`]
//! and [`notify::Notifier`] traits; the process entry point decides which
//! implementations to inject.
//!
//! # Modules
//!
//! - `membership` - Trip membership and ownership checks
//! - `split` - Expense split validation and normalization
//! - `settlement` - Pending/settled debt state machine
//! - `balance` - Net pairwise balances per trip
//! - `trip`, `expense`, `account` - CRUD services built on the above
//! - `store` - Storage collaborator contract plus an in-memory implementation

pub mod account;
pub mod balance;
pub mod error;
pub mod expense;
mod ledger;
pub mod membership;
pub mod notify;
pub mod settlement;
pub mod split;
pub mod store;
pub mod trip;

pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use notify::{DeliveryError, Notifier};
pub use store::{LedgerStore, StoreError};
