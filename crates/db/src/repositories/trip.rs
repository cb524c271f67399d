//! Trip repository for database operations.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, IntoActiveModel,
    Statement,
};
use serde_json::Value as JsonValue;
use tripsplit_core::store::{StoreError, StoreResult};
use tripsplit_core::trip::Trip;
use tripsplit_shared::types::{TripId, UserId};

use super::json::{ids_from_json, ids_to_json};
use crate::entities::trips;

/// Trips the user owns or is listed in, oldest first.
const LIST_FOR_MEMBER_SQL: &str = r"
SELECT * FROM trips
WHERE owner_id = $1 OR participant_ids @> $2
ORDER BY created_at, id
";

/// Trip repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TripRepository {
    db: DatabaseConnection,
}

impl TripRepository {
    /// Creates a new trip repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a trip.
    pub async fn create(&self, trip: Trip) -> StoreResult<Trip> {
        let model = to_model(&trip)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(StoreError::backend)?;

        to_domain(model)
    }

    /// Finds a trip by ID.
    pub async fn find_by_id(&self, id: TripId) -> StoreResult<Option<Trip>> {
        trips::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .map(to_domain)
            .transpose()
    }

    /// Lists trips the user owns or participates in.
    pub async fn list_for_member(&self, user_id: UserId) -> StoreResult<Vec<Trip>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            LIST_FOR_MEMBER_SQL,
            [
                user_id.into_inner().into(),
                JsonValue::Array(vec![JsonValue::String(user_id.to_string())]).into(),
            ],
        );

        trips::Entity::find()
            .from_raw_sql(stmt)
            .all(&self.db)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Replaces every column of a trip. Returns `None` if the row is gone.
    pub async fn replace(&self, trip: Trip) -> StoreResult<Option<Trip>> {
        let result = to_model(&trip)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await;

        match result {
            Ok(model) => to_domain(model).map(Some),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    /// Deletes a trip by ID.
    pub async fn delete(&self, id: TripId) -> StoreResult<bool> {
        let result = trips::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected > 0)
    }
}

fn to_model(trip: &Trip) -> trips::Model {
    trips::Model {
        id: trip.id.into_inner(),
        name: trip.name.clone(),
        description: trip.description.clone(),
        owner_id: trip.owner_id.into_inner(),
        participant_ids: ids_to_json(&trip.participant_ids),
        created_at: trip.created_at.into(),
        updated_at: trip.updated_at.into(),
    }
}

fn to_domain(model: trips::Model) -> StoreResult<Trip> {
    Ok(Trip {
        id: TripId::from_uuid(model.id),
        participant_ids: ids_from_json(model.participant_ids)?,
        name: model.name,
        description: model.description,
        owner_id: UserId::from_uuid(model.owner_id),
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
    })
}
