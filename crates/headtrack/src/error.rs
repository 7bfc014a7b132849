//! Error types for headtrack.
//!
//! This module defines all error types used throughout the headtrack crate.
//! Validation variants carry the exact message shown to the operator; the
//! remaining variants provide structured context for logs.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for headtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to write the record database file.
    #[error("failed to write database at {path}: {source}")]
    StoreWrite {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

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

    // === Authentication Errors ===
    /// The old password supplied to a reset did not match.
    #[error("Incorrect old password!")]
    IncorrectOldPassword,

    /// New password and confirmation differ.
    #[error("Passwords do not match!")]
    PasswordMismatch,

    /// New password failed the strength policy.
    #[error("Password must be at least 8 characters long, contain a number, and a special character!")]
    PasswordPolicy,

    /// Failed to persist the credential file.
    #[error("failed to write credentials at {path}: {source}")]
    CredentialsWrite {
        /// Path to the credential file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Inventory Errors ===
    /// No record matched the requested head number.
    #[error("Machine not found!")]
    MachineNotFound {
        /// The head number that was looked up.
        head_number: String,
    },

    // === Export Errors ===
    /// Export requested with nothing to export.
    #[error("No data to export!")]
    ExportEmpty,

    /// Spreadsheet serialization failed.
    #[error("Failed to export: {message}")]
    ExportFailed {
        /// Description of what went wrong.
        message: String,
    },

    // === Server Errors ===
    /// Could not bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for headtrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::ExportFailed {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create a machine-not-found error for the given head number.
    #[must_use]
    pub fn machine_not_found(head_number: impl Into<String>) -> Self {
        Self::MachineNotFound {
            head_number: head_number.into(),
        }
    }

    /// Check if this error means the looked-up machine doesn't exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MachineNotFound { .. })
    }

    /// Check if this error is a password validation failure.
    ///
    /// Validation failures are surfaced as flash messages and leave all
    /// state unchanged.
    #[must_use]
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            Self::IncorrectOldPassword | Self::PasswordMismatch | Self::PasswordPolicy
        )
    }

    /// Check if this error is an export failure (empty set or serialization).
    #[must_use]
    pub fn is_export_error(&self) -> bool {
        matches!(self, Self::ExportEmpty | Self::ExportFailed { .. })
    }
}
