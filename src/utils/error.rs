use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Could not enumerate remote branches: {message}")]
    Collection { message: String },

    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("Invalid execution state: {message}")]
    InvalidState { message: String },

    #[error("Invalid reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn collection(message: impl Into<String>) -> Self {
        Self::Collection {
            message: message.into(),
        }
    }

    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Fatal errors are raised before any mutation; everything else is
    /// recorded per branch instead of surfacing here.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}
