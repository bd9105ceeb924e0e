//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::credentials::CredentialsError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Service-account credentials unusable
    CredentialsError,
    /// Runtime or server failed to start
    BootFailed,
    /// Submission failed validation
    InvalidInput,
    /// Document store failure
    StoreError,
    /// No student with that id
    NotFound,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ADMISSIONS_CLI_CONFIG_ERROR",
            Self::IoError => "ADMISSIONS_CLI_IO_ERROR",
            Self::CredentialsError => "ADMISSIONS_CLI_CREDENTIALS_ERROR",
            Self::BootFailed => "ADMISSIONS_CLI_BOOT_FAILED",
            Self::InvalidInput => "ADMISSIONS_CLI_INVALID_INPUT",
            Self::StoreError => "ADMISSIONS_CLI_STORE_ERROR",
            Self::NotFound => "ADMISSIONS_CLI_NOT_FOUND",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(CliErrorCode::NotFound, format!("Student '{}' not found", id))
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CredentialsError> for CliError {
    fn from(e: CredentialsError) -> Self {
        Self::new(CliErrorCode::CredentialsError, e.to_string())
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        let code = match e {
            RegistryError::Invalid(_) => CliErrorCode::InvalidInput,
            RegistryError::Store(StoreError::NotFound(_)) => CliErrorCode::NotFound,
            RegistryError::Store(_) => CliErrorCode::StoreError,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
