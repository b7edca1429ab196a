//! Local artifact synthesis, the fallback when no server-side report exists.

pub mod pdf;
