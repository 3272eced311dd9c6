use book_manager_import::ImportError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Import aborted
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// No user with the given username
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// Username already taken
    #[error("User already exists: {0}")]
    UserExists(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn unknown_user(username: impl Into<String>) -> Self {
        Self::UnknownUser(username.into())
    }

    pub(crate) fn user_exists(username: impl Into<String>) -> Self {
        Self::UserExists(username.into())
    }
}
