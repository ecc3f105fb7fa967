//! Per-table query functions.

pub mod goals;
pub mod reviews;
pub mod roadmap_steps;
pub mod schedules;
pub mod tasks;
