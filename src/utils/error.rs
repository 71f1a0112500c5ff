use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Repository request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Repository returned HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Repository query failed: {message}")]
    QueryError { message: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Field '{field}' is not editable while the litter is {status}")]
    NotEditable { field: String, status: String },
}

impl RegistryError {
    /// The human-readable message carried by the error, if any.
    ///
    /// Transport and decoding errors have no message a visitor could act on,
    /// and blank repository messages count as absent.
    pub fn message(&self) -> Option<String> {
        let message = match self {
            RegistryError::QueryError { message } => message.clone(),
            RegistryError::StatusError { body, .. } => body.clone(),
            RegistryError::ValidationError { message } => message.clone(),
            RegistryError::HttpError(_)
            | RegistryError::IoError(_)
            | RegistryError::SerializationError(_) => return None,
            other => other.to_string(),
        };

        let trimmed = message.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RegistryError::HttpError(e) => e.is_timeout() || e.is_connect(),
            RegistryError::StatusError { status, .. } => *status >= 500,
            RegistryError::IoError(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
