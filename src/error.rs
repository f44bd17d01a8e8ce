//! Error type shared by the store, the configuration loader and the engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A collocation must group between two and four words.
    #[error("invalid collocation '{id}': {reason}")]
    InvalidCollocation { id: String, reason: String },

    #[error("unknown collocation: {0}")]
    UnknownCollocation(String),

    /// The caller asked for something its inputs cannot support.
    #[error("contract violation: {0}")]
    Contract(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
