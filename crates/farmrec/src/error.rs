//! Error types for farmrec.
//!
//! This module defines all error types used throughout the farmrec crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::records::Role;

/// The main error type for farmrec operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// A field failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The username is already registered.
    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    /// A farmer with this name is already registered.
    #[error("farmer '{0}' already registered")]
    FarmerExists(String),

    /// The crop is already present in the reference table.
    #[error("crop '{0}' already exists")]
    CropExists(String),

    // === Auth Errors ===
    /// Login attempted before anyone registered.
    #[error("no users found, please register first")]
    NoUsers,

    /// Login attempted for an unknown username.
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// The password did not match.
    #[error("incorrect password")]
    IncorrectPassword,

    /// The session's role may not perform this operation.
    #[error("this operation requires the {required} role")]
    PermissionDenied {
        /// The role the operation needs.
        required: Role,
    },

    // === Lookup Errors ===
    /// A row referenced by id or key does not exist.
    #[error("{kind} '{key}' not found")]
    NotFound {
        /// What kind of record was looked up.
        kind: &'static str,
        /// The id or key that was requested.
        key: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a CSV file failed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },
}

/// A specialized Result type for farmrec operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a field validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Check if this error was caused by bad user input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UsernameTaken(_)
                | Self::FarmerExists(_)
                | Self::CropExists(_)
        )
    }

    /// Check if this error is a failed login or a role mismatch.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::NoUsers
                | Self::UserNotFound(_)
                | Self::IncorrectPassword
                | Self::PermissionDenied { .. }
        )
    }
}
