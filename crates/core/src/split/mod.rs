//! Split Calculator.
//!
//! Validates and normalizes how an expense amount divides across its
//! participants. Everything here is pure: no store, no clock.

mod allocation;
mod calculator;
mod error;

#[cfg(test)]
mod calculator_props;

pub use allocation::allocate_equal;
pub use calculator::{ParticipantShare, SplitKind, compute_split, shares_by_user};
pub use error::SplitError;
