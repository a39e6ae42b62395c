// Logging Adapter Errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

pub type Result<T> = std::result::Result<T, LogError>;
