//! Membership Authority.
//!
//! Member = trip owner OR listed participant. Every trip-scoped call loads the
//! current trip and checks it here; nothing is cached between calls.

use tripsplit_shared::types::{TripId, UserId};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::notify::Notifier;
use crate::store::LedgerStore;
use crate::trip::Trip;

/// Checks that `user_id` may read or write `trip`.
pub fn check_member(trip: &Trip, user_id: UserId) -> LedgerResult<()> {
    if trip.is_member(user_id) {
        Ok(())
    } else {
        Err(LedgerError::NotMember(trip.id))
    }
}

/// Checks that `user_id` owns `trip`.
pub fn check_owner(trip: &Trip, user_id: UserId) -> LedgerResult<()> {
    if trip.is_owner(user_id) {
        Ok(())
    } else {
        Err(LedgerError::NotOwner(trip.id))
    }
}

/// Checks that every user in `users` belongs to `trip`.
pub fn check_all_members(
    trip: &Trip,
    users: impl IntoIterator<Item = UserId>,
) -> LedgerResult<()> {
    for user_id in users {
        if !trip.is_member(user_id) {
            return Err(LedgerError::NotTripMember {
                trip_id: trip.id,
                user_id,
            });
        }
    }
    Ok(())
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Loads a trip and checks that `user_id` is a member.
    ///
    /// Unknown trip is `TripNotFound`, known trip with a non-member is `NotMember`.
    pub async fn is_member(&self, trip_id: TripId, user_id: UserId) -> LedgerResult<Trip> {
        let trip = self.load_trip(trip_id).await?;
        check_member(&trip, user_id)?;
        Ok(trip)
    }

    /// Loads a trip and checks that `user_id` owns it.
    pub async fn require_owner(&self, trip_id: TripId, user_id: UserId) -> LedgerResult<Trip> {
        let trip = self.load_trip(trip_id).await?;
        check_owner(&trip, user_id)?;
        Ok(trip)
    }

    async fn load_trip(&self, trip_id: TripId) -> LedgerResult<Trip> {
        self.store
            .find_trip(trip_id)
            .await?
            .ok_or(LedgerError::TripNotFound(trip_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trip(owner: UserId, participants: Vec<UserId>) -> Trip {
        let now = Utc::now();
        Trip {
            id: TripId::new(),
            name: "Goa".to_string(),
            description: None,
            owner_id: owner,
            participant_ids: participants,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_check_member() {
        let owner = UserId::new();
        let guest = UserId::new();
        let t = trip(owner, vec![guest]);

        assert!(check_member(&t, owner).is_ok());
        assert!(check_member(&t, guest).is_ok());
        assert!(matches!(
            check_member(&t, UserId::new()),
            Err(LedgerError::NotMember(id)) if id == t.id
        ));
    }

    #[test]
    fn test_check_owner_rejects_participants() {
        let owner = UserId::new();
        let guest = UserId::new();
        let t = trip(owner, vec![guest]);

        assert!(check_owner(&t, owner).is_ok());
        assert!(matches!(check_owner(&t, guest), Err(LedgerError::NotOwner(_))));
    }

    #[test]
    fn test_check_all_members_names_the_outsider() {
        let owner = UserId::new();
        let outsider = UserId::new();
        let t = trip(owner, vec![]);

        let err = check_all_members(&t, [owner, outsider]).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NotTripMember { user_id, .. } if user_id == outsider
        ));
    }
}
