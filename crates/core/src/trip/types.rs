//! Trip types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripsplit_shared::types::{TripId, UserId};

/// A shared context grouping participants and their expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Trip ID.
    pub id: TripId,
    /// Trip name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creating user, always an implicit member.
    pub owner_id: UserId,
    /// Listed participants, never containing the owner.
    #[serde(rename = "participants")]
    pub participant_ids: Vec<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Returns true if the user is the owner or a listed participant.
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.participant_ids.contains(&user_id)
    }

    /// Returns true if the user owns the trip.
    #[must_use]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Input for creating a trip.
#[derive(Debug, Clone, Default)]
pub struct CreateTripInput {
    /// Trip name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Users to add besides the caller.
    pub participant_ids: Vec<UserId>,
}

/// Partial update of a trip. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    /// New name.
    pub name: Option<String>,
    /// New description. `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Replacement participant list.
    pub participant_ids: Option<Vec<UserId>>,
}
