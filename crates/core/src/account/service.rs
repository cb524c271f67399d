//! Account operations on the ledger.

use chrono::Utc;
use tripsplit_shared::types::UserId;

use super::password::{hash_password, verify_password};
use super::types::{NewUser, User};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::notify::Notifier;
use crate::store::{LedgerStore, StoreError};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct SignupInput {
    /// Email, normalized before storage.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Plaintext password.
    pub password: String,
}

/// Trims and lowercases an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Registers a new user.
    pub async fn signup(&self, input: SignupInput) -> LedgerResult<User> {
        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(LedgerError::InvalidInput("a valid email is required".into()));
        }
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("name is required".into()));
        }
        if input.password.is_empty() {
            return Err(LedgerError::InvalidInput("password is required".into()));
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| LedgerError::Password(e.to_string()))?;

        let new_user = NewUser {
            id: UserId::new(),
            email: email.clone(),
            name,
            password_hash,
            created_at: Utc::now(),
        };

        match self.store.insert_user(new_user).await {
            Ok(user) => Ok(user),
            Err(StoreError::Duplicate(_)) => Err(LedgerError::EmailTaken(email)),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks an email/password pair.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> LedgerResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(LedgerError::InvalidInput(
                "email and password are required".into(),
            ));
        }

        let credentials = self
            .store
            .find_user_credentials(&email)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        let valid = verify_password(password, &credentials.password_hash)
            .map_err(|e| LedgerError::Password(e.to_string()))?;

        if valid {
            Ok(credentials.user)
        } else {
            Err(LedgerError::InvalidCredentials)
        }
    }

    /// Loads the user behind a verified token.
    pub async fn current_user(&self, user_id: UserId) -> LedgerResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::InMemoryLedgerStore;

    fn ledger() -> Ledger<InMemoryLedgerStore, RecordingNotifier> {
        Ledger::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(RecordingNotifier::new()),
        )
    }

    fn input(email: &str) -> SignupInput {
        SignupInput {
            email: email.to_string(),
            name: "Ana".to_string(),
            password: "hunter22".to_string(),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let ledger = ledger();
        let user = ledger.signup(input(" Ana@Example.com")).await.unwrap();
        assert_eq!(user.email, "ana@example.com");

        let logged_in = ledger.login("ANA@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(ledger.current_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflicts() {
        let ledger = ledger();
        ledger.signup(input("ana@example.com")).await.unwrap();

        let err = ledger.signup(input("ANA@example.com")).await.unwrap_err();
        assert!(matches!(err, LedgerError::EmailTaken(_)));
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let ledger = ledger();
        ledger.signup(input("ana@example.com")).await.unwrap();

        let wrong = ledger.login("ana@example.com", "nope").await.unwrap_err();
        let unknown = ledger.login("bo@example.com", "hunter22").await.unwrap_err();

        assert!(matches!(wrong, LedgerError::InvalidCredentials));
        assert!(matches!(unknown, LedgerError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_signup_requires_fields() {
        let ledger = ledger();
        let mut missing_name = input("ana@example.com");
        missing_name.name = "  ".to_string();

        assert!(matches!(
            ledger.signup(missing_name).await,
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            ledger.signup(input("not-an-email")).await,
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let err = ledger().current_user(UserId::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));
    }
}
