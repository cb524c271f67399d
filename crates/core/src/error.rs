//! Ledger error types.
//!
//! Every core operation returns `LedgerResult<T>`. Variants are grouped by the
//! HTTP class they map to.

use thiserror::Error;
use tripsplit_shared::AppError;
use tripsplit_shared::types::{ExpenseId, TripId, UserId};

use crate::split::SplitError;
use crate::store::StoreError;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Expense split failed validation.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// A required field is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payer, participant or settlement party does not belong to the trip.
    #[error("User {user_id} is not a member of trip {trip_id}")]
    NotTripMember {
        /// The trip being written to.
        trip_id: TripId,
        /// The user referenced by the request.
        user_id: UserId,
    },

    /// A settlement names the same user as debtor and creditor.
    #[error("Debtor and creditor must be different users")]
    SelfSettlement,

    // ========== Authentication Errors ==========
    /// Email/password pair did not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    // ========== Authorization Errors ==========
    /// Caller is neither the owner nor a participant of the trip.
    #[error("You are not a member of trip {0}")]
    NotMember(TripId),

    /// Caller is a member but the operation is reserved to the owner.
    #[error("Only the owner can modify trip {0}")]
    NotOwner(TripId),

    // ========== Not Found Errors ==========
    /// Trip id does not resolve.
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    /// Expense id does not resolve.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// User id does not resolve.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // ========== Conflict Errors ==========
    /// Email address already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    // ========== Collaborator Errors ==========
    /// Backing store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failure.
    #[error("Password hashing failed: {0}")]
    Password(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Split(e) => e.error_code(),
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotTripMember { .. } => "NOT_TRIP_MEMBER",
            Self::SelfSettlement => "SELF_SETTLEMENT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotMember(_) => "NOT_A_MEMBER",
            Self::NotOwner(_) => "NOT_OWNER",
            Self::TripNotFound(_) => "TRIP_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::EmailTaken(_) => "EMAIL_TAKEN",
            Self::Store(_) => "STORE_ERROR",
            Self::Password(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::Split(_)
            | Self::InvalidInput(_)
            | Self::NotTripMember { .. }
            | Self::SelfSettlement => 400,

            // 401 Unauthorized
            Self::InvalidCredentials => 401,

            // 403 Forbidden - membership errors
            Self::NotMember(_) | Self::NotOwner(_) => 403,

            // 404 Not Found
            Self::TripNotFound(_) | Self::ExpenseNotFound(_) | Self::UserNotFound(_) => 404,

            // 409 Conflict
            Self::EmailTaken(_) => 409,

            // 500 Internal Server Error
            Self::Store(_) | Self::Password(_) => 500,
        }
    }

    /// Returns true if the error is an authorization failure.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.http_status_code() == 403
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::Validation(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => match err {
                LedgerError::Store(_) => Self::Database(message),
                _ => Self::Internal(message),
            },
        }
    }
}
