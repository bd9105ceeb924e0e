//! Observability for the admissions service
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Atomic counters, served at `/metrics`
//!
//! Observability never changes the outcome of an operation: logging
//! failures are swallowed.
//!
//! ```ignore
//! use admissions::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::StudentDeleted, &[("id", "Xy12")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Severity an event is logged at when the caller does not choose one
pub fn default_severity(event: Event) -> Severity {
    match event {
        e if e.is_fatal() => Severity::Fatal,
        Event::StoreFailure => Severity::Error,
        Event::SubmissionRejected => Severity::Warn,
        _ => Severity::Info,
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(default_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(default_severity(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_severity() {
        assert_eq!(default_severity(Event::CredentialsFailed), Severity::Fatal);
        assert_eq!(default_severity(Event::StoreFailure), Severity::Error);
        assert_eq!(default_severity(Event::SubmissionRejected), Severity::Warn);
        assert_eq!(default_severity(Event::StudentRegistered), Severity::Info);
    }

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event_with_fields(Event::ConfigLoaded, &[("backend", "memory")]);
    }
}
