use dc_core::DcError;
use thiserror::Error;

/// Errors raised while loading seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed parse error: {0}")]
    Parse(String),

    #[error("invalid seed: {0}")]
    Invalid(String),

    #[error("seed rejected by store: {0}")]
    Store(#[from] DcError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SeedResult<T> = Result<T, SeedError>;
