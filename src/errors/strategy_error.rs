//! Strategy registry errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Unknown strategy: {0}")]
    NotFound(String),

    #[error("Strategy already registered: {0}")]
    Duplicate(String),

    #[error("Invalid config for strategy {id}: {source}")]
    InvalidConfig {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type StrategyResult<T> = Result<T, StrategyError>;
