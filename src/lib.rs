pub mod analysis;
pub mod clock;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod models;
pub mod shuffle;

pub use config::EngineConfig;
pub use engine::{DifficultySelection, DueItem, MasteryEngine};
pub use error::{EngineError, EngineResult};
