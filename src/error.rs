//! Unified error types for selfwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the shared health state store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error delivering a notice to a contact
    #[error("Send error: {0}")]
    Send(#[from] SendError),

    /// Error from a supervised background task
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// IO error (file operations, terminal output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Contact type without a registered sender
    #[error("No sender registered for contact type '{0}'")]
    UnknownContactType(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors from the shared health state store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport or storage failure; the store could not be observed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded
    #[error("Corrupt value for key '{key}': {value}")]
    Corrupt { key: String, value: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Errors from notice delivery
#[derive(Error, Debug)]
pub enum SendError {
    /// Sender rejected or failed to deliver the notice
    #[error("Failed to deliver to {contact}: {message}")]
    Delivery { contact: String, message: String },

    /// IO error while writing the notice
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Notice could not be serialized
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal errors from supervised background tasks
#[derive(Error, Debug)]
pub enum TaskError {
    /// The task panicked
    #[error("Task '{0}' panicked")]
    Panicked(String),

    /// The task did not exit within the shutdown timeout
    #[error("Task '{name}' did not stop within {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u128 },
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
