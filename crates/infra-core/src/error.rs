use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("STATE.md not found")]
    StateNotFound,

    #[error("No config.json found at {0}")]
    ConfigNotFound(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid stage: {stage}. Valid stages: {valid}")]
    InvalidStage { stage: String, valid: String },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, InfraError>;
