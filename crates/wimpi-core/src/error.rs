//! Error types for Wimpi

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("AI API key not configured (set {0})")]
    MissingApiKey(&'static str),

    #[error("Daily AI quota exhausted, try again tomorrow or use the offline advisor")]
    QuotaExceeded,

    #[error("Too many AI requests, wait a moment and try again")]
    RateLimited,

    #[error("AI error: {0}")]
    Ai(String),
}

pub type Result<T> = std::result::Result<T, Error>;
