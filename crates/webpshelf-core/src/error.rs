//! Error types module
//!
//! Configuration errors are raised before any store access happens and always
//! propagate to the caller.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),
}

impl ConfigError {
    /// Name of the offending field, if the error concerns a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingField(field) => Some(field),
            ConfigError::InvalidValue { field, .. } => Some(field),
            ConfigError::Env(_) => None,
        }
    }
}
