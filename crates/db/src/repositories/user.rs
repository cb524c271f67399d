//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use tripsplit_core::account::{NewUser, User, UserCredentials};
use tripsplit_core::store::{StoreError, StoreResult};
use tripsplit_shared::types::UserId;

use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user. A taken email yields `StoreError::Duplicate`.
    pub async fn create(&self, user: NewUser) -> StoreResult<User> {
        let model = users::ActiveModel {
            id: Set(user.id.into_inner()),
            email: Set(user.email.clone()),
            name: Set(user.name),
            password_hash: Set(user.password_hash),
            created_at: Set(user.created_at.into()),
        };

        match model.insert(&self.db).await {
            Ok(model) => Ok(to_domain(model)),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Duplicate(format!("email {}", user.email)))
            }
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let model = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(model.map(to_domain))
    }

    /// Finds a user and password hash by normalized email.
    pub async fn find_credentials(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(model.map(|m| {
            let password_hash = m.password_hash.clone();
            UserCredentials {
                user: to_domain(m),
                password_hash,
            }
        }))
    }

    /// Returns the users that exist among `ids`.
    pub async fn find_many(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .all(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(models.into_iter().map(to_domain).collect())
    }
}

/// Returns true if the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn to_domain(model: users::Model) -> User {
    User {
        id: UserId::from_uuid(model.id),
        email: model.email,
        name: model.name,
        created_at: model.created_at.to_utc(),
    }
}
