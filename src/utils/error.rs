use std::fmt;

use crate::legado::LegacyError;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    ValidationError(String),
    Legacy(LegacyError),
    IoError(std::io::Error),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Legacy(err) => write!(f, "Legacy database error: {}", err),
            AppError::IoError(err) => write!(f, "I/O error: {}", err),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Legacy(err) => Some(err),
            AppError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LegacyError> for AppError {
    fn from(err: LegacyError) -> Self {
        AppError::Legacy(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
