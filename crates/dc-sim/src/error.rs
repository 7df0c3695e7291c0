use dc_core::DcError;
use dc_store::SeedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("dashboard configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DcError),

    #[error("seed data error: {0}")]
    Seed(#[from] SeedError),

    #[error("config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dashboard has been shut down")]
    ShutDown,
}

pub type SimResult<T> = Result<T, SimError>;
