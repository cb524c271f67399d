//! `SeaORM` entity definitions.

pub mod expenses;
pub mod settlements;
pub mod trips;
pub mod users;
