//! Observable events
//!
//! Every log line the service writes names one of these.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Service-account credentials installed
    CredentialsLoaded,
    /// Credentials could not be loaded (FATAL)
    CredentialsFailed,
    /// HTTP server accepting requests
    Serving,
    /// Server stopped
    ShutdownComplete,

    // Record lifecycle
    /// New student written
    StudentRegistered,
    /// Existing student overwritten
    StudentUpdated,
    /// Student removed (or was already absent)
    StudentDeleted,
    /// Submission failed validation; nothing written
    SubmissionRejected,

    // Store
    /// Store call failed
    StoreFailure,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "ADMISSIONS_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CredentialsLoaded => "CREDENTIALS_LOADED",
            Event::CredentialsFailed => "CREDENTIALS_FAILED",
            Event::Serving => "ADMISSIONS_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::StudentRegistered => "STUDENT_REGISTERED",
            Event::StudentUpdated => "STUDENT_UPDATED",
            Event::StudentDeleted => "STUDENT_DELETED",
            Event::SubmissionRejected => "SUBMISSION_REJECTED",

            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CredentialsFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
