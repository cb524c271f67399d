//! Split validation errors.

use thiserror::Error;
use tripsplit_shared::types::{Money, UserId};

/// Reasons an expense split is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// No participants were given.
    #[error("Expense must have at least one participant")]
    EmptyParticipants,

    /// Amount is zero or negative.
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// The same user appears twice in the participant list.
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(UserId),

    /// Unequal split without any shares.
    #[error("Unequal split requires shares")]
    MissingShares,

    /// A share is keyed by a user that is not a participant.
    #[error("Share references {0}, who is not a participant")]
    UnknownShareParticipant(UserId),

    /// A share value is below zero.
    #[error("Share for {user_id} is negative: {amount}")]
    NegativeShare {
        /// Participant whose share is negative.
        user_id: UserId,
        /// The offending value.
        amount: Money,
    },

    /// Shares do not add up to the expense amount.
    #[error("Shares sum to {actual}, expected {expected}")]
    ShareSumMismatch {
        /// Expense amount.
        expected: Money,
        /// Sum of the provided shares.
        actual: Money,
    },

    /// A running total left the representable range.
    #[error("Amounts exceed the supported range")]
    AmountOverflow,
}

impl SplitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::MissingShares => "MISSING_SHARES",
            Self::UnknownShareParticipant(_) => "UNKNOWN_SHARE_PARTICIPANT",
            Self::NegativeShare { .. } => "NEGATIVE_SHARE",
            Self::ShareSumMismatch { .. } => "SHARE_SUM_MISMATCH",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
        }
    }
}
