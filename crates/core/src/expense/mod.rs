//! Expenses recorded against a trip.

mod service;
mod types;

pub use types::{CreateExpenseInput, Expense, ExpensePatch};
