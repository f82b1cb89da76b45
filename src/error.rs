use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Google Ads API error: {0}")]
    GoogleAds(String),

    #[error("OAuth2 authorization error: {0}")]
    Auth(String),

    #[error("OAuth2 token refresh failed: {0}")]
    Refresh(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
