//! Small line-oriented widgets composed by the views.

pub mod bars;
pub mod header;
pub mod indicators;
