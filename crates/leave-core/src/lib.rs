//! Domain layer for the leave dashboard.
//!
//! Leave records and their derived fields, the per-record metric
//! calculations (working days, inclusive duration, calendar month order),
//! the shared error type, CLI settings and number formatting helpers.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{LeaveError, Result};
