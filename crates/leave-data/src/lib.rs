//! Data layer for the leave dashboard.
//!
//! Loads and validates the leave CSV, builds the aggregate views and runs the
//! report pipeline that the presentation layer consumes.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use leave_core as core;
