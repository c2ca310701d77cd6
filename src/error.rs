use thiserror::Error;

#[derive(Error, Debug)]
pub enum HitError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("git: {0}")]
    Git(String),

    #[error("clone failed: {0}")]
    Clone(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for HitError {
    fn from(err: tokio::task::JoinError) -> Self {
        HitError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HitError>;
