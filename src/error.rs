use thiserror::Error;

pub type Result<T> = std::result::Result<T, HoursError>;

#[derive(Error, Debug)]
pub enum HoursError {
    #[error("Invalid commit timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid repository name '{0}', expected owner/name")]
    InvalidRepository(String),
    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
