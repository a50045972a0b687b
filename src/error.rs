use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Runner task failed: {0}")]
    Runner(String),
}

pub type Result<T> = std::result::Result<T, Error>;
