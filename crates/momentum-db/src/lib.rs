//! PostgreSQL storage for goals, roadmap steps, tasks and daily reviews.
//!
//! Query functions are grouped per table under [`queries`]. Functions that
//! must run inside a caller-owned transaction take `&mut PgConnection`
//! (pass `&mut *tx`); everything else takes the pool.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
