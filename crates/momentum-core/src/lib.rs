pub mod clock;
pub mod engine;
pub mod error;
pub mod generator;
pub mod review;
pub mod roadmap;
pub mod schedule;
pub mod tasks;
pub mod testing;
pub mod token;

pub use engine::Engine;
pub use error::{CoreError, CoreResult};
