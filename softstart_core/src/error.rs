use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RampError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid target: {0} is not a finite number")]
    InvalidTarget(f64),
    #[error("persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
