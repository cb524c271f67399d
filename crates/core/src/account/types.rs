//! User account types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripsplit_shared::auth::UserInfo;
use tripsplit_shared::types::UserId;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Normalized (trimmed, lowercase) email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Signup time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// A user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Pre-generated user ID.
    pub id: UserId,
    /// Normalized email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Signup time.
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash, used only by login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// The user.
    pub user: User,
    /// Argon2id PHC string.
    pub password_hash: String,
}
