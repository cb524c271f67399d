//! User accounts: signup, login and lookup.

mod password;
mod service;
mod types;

pub use password::{PasswordError, hash_password, verify_password};
pub use service::{SignupInput, normalize_email};
pub use types::{NewUser, User, UserCredentials};
