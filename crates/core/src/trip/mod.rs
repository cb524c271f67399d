//! Trips: creation, lookup, owner-only update and cascading delete.

mod service;
mod types;

pub use service::TripDeletion;
pub use types::{CreateTripInput, Trip, TripPatch};
