//! Balance Aggregator.
//!
//! Net pairwise balances derived from a trip's expenses and settled
//! settlements. Read-only.

mod aggregate;
mod service;

#[cfg(test)]
mod aggregate_props;

pub use aggregate::{Debt, PairBalance, TripBalances, aggregate};
