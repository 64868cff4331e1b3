//! Error types for Prism

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Statistics error: {0}")]
    Statistics(String),
}

pub type Result<T> = std::result::Result<T, Error>;
