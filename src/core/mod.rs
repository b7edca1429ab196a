//! State, data model, and error taxonomy for the dashboard.

pub mod error;
pub mod state;
pub mod time;
pub mod types;
