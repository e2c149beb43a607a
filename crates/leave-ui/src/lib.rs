//! Terminal UI layer for the leave dashboard.
//!
//! Provides themes, bar and indicator components, chart and table views, the
//! plain-text report renderer, and the interactive application loop built on
//! [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod text_report;
pub mod themes;

pub use leave_core as core;
