//! Settlement State Machine.
//!
//! ```text
//! NONE --remind--> PENDING --settle--> SETTLED
//!   \______________settle_____________/
//! ```
//!
//! One instance per (trip, debtor, creditor, amount). The store guarantees at
//! most one open PENDING record per key; all transitions go through its atomic
//! conditional operations.

mod notice;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use notice::{escape_html, reminder_email};
pub use types::{
    RemindOutcome, SettleOutcome, SettleTransition, Settlement, SettlementKey, SettlementStatus,
};
