pub mod artifact;
pub mod config;
pub mod core;
pub mod ui;
pub mod workflows;
