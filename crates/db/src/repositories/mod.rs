//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod json;

pub mod expense;
pub mod settlement;
pub mod trip;
pub mod user;

pub use expense::ExpenseRepository;
pub use settlement::SettlementRepository;
pub use trip::TripRepository;
pub use user::UserRepository;
