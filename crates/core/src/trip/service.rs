//! Trip operations on the ledger.

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tripsplit_shared::types::{TripId, UserId};

use super::types::{CreateTripInput, Trip, TripPatch};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::notify::Notifier;
use crate::store::LedgerStore;

/// Rows removed by a trip deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDeletion {
    /// Expenses removed.
    pub expenses_deleted: u64,
    /// Settlement records removed.
    pub settlements_deleted: u64,
}

/// Removes duplicates and the owner, keeping first-seen order.
fn normalize_participants(owner_id: UserId, participants: Vec<UserId>) -> Vec<UserId> {
    let mut seen = HashSet::with_capacity(participants.len());
    participants
        .into_iter()
        .filter(|id| *id != owner_id && seen.insert(*id))
        .collect()
}

fn normalize_name(name: &str) -> LedgerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidInput("trip name is required".into()));
    }
    Ok(name.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Lists trips the caller owns or participates in.
    pub async fn list_trips(&self, caller: UserId) -> LedgerResult<Vec<Trip>> {
        Ok(self.store.list_trips_for_member(caller).await?)
    }

    /// Creates a trip owned by the caller.
    pub async fn create_trip(&self, caller: UserId, input: CreateTripInput) -> LedgerResult<Trip> {
        let name = normalize_name(&input.name)?;
        let participant_ids = normalize_participants(caller, input.participant_ids);
        self.ensure_users_exist(&participant_ids).await?;

        let now = Utc::now();
        let trip = Trip {
            id: TripId::new(),
            name,
            description: normalize_description(input.description),
            owner_id: caller,
            participant_ids,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert_trip(trip).await?)
    }

    /// Reads a trip. Member only.
    pub async fn get_trip(&self, trip_id: TripId, caller: UserId) -> LedgerResult<Trip> {
        self.is_member(trip_id, caller).await
    }

    /// Applies a patch to a trip. Owner only.
    pub async fn update_trip(
        &self,
        trip_id: TripId,
        caller: UserId,
        patch: TripPatch,
    ) -> LedgerResult<Trip> {
        let mut trip = self.require_owner(trip_id, caller).await?;

        if let Some(name) = patch.name {
            trip.name = normalize_name(&name)?;
        }
        if let Some(description) = patch.description {
            trip.description = normalize_description(description);
        }
        if let Some(participants) = patch.participant_ids {
            let participants = normalize_participants(trip.owner_id, participants);
            self.ensure_users_exist(&participants).await?;
            trip.participant_ids = participants;
        }
        trip.updated_at = Utc::now();

        self.store
            .update_trip(trip)
            .await?
            .ok_or(LedgerError::TripNotFound(trip_id))
    }

    /// Deletes a trip with its expenses and settlements. Owner only.
    ///
    /// The three deletes run in sequence and are not atomic.
    pub async fn delete_trip(&self, trip_id: TripId, caller: UserId) -> LedgerResult<TripDeletion> {
        self.require_owner(trip_id, caller).await?;

        let expenses_deleted = self.store.delete_expenses_for_trip(trip_id).await?;
        let settlements_deleted = self.store.delete_settlements_for_trip(trip_id).await?;
        if !self.store.delete_trip(trip_id).await? {
            return Err(LedgerError::TripNotFound(trip_id));
        }

        Ok(TripDeletion {
            expenses_deleted,
            settlements_deleted,
        })
    }

    pub(crate) async fn ensure_users_exist(&self, ids: &[UserId]) -> LedgerResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let found: HashSet<UserId> = self
            .store
            .find_users(ids)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        match ids.iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(LedgerError::UserNotFound(*missing)),
            None => Ok(()),
        }
    }
}
