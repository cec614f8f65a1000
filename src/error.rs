//! Error types shared by the services

use thiserror::Error;

use crate::services::identity::AuthError;

/// Result type for service operations
pub type AppResult<T> = Result<T, AppError>;

/// Errors that can occur in the services
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(u32),

    #[error("Shop item not found: {0}")]
    ShopItemNotFound(String),

    #[error("Insufficient coins: need {needed}, have {balance}")]
    InsufficientCoins { needed: u32, balance: u32 },

    #[error("Challenge not found: {0}")]
    ChallengeNotFound(String),

    #[error("Challenge is full: {0}")]
    ChallengeFull(String),

    #[error("Challenge already finished: {0}")]
    ChallengeClosed(String),

    #[error("Already joined challenge: {0}")]
    AlreadyJoined(String),

    #[error("Not a participant of challenge: {0}")]
    NotParticipant(String),

    #[error("Already finished challenge: {0}")]
    AlreadyFinished(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
