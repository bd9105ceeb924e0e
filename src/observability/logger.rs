//! Structured JSON logger
//!
//! - One log line = one event
//! - Key order: `ts`, `event`, `severity`, then fields alphabetically
//! - ERROR and FATAL go to stderr, everything else to stdout
//! - Synchronous, no buffering
//!
//! Lines below the minimum severity are dropped. The minimum is read once
//! from `ADMISSIONS_LOG` (`trace`, `info`, `warn`, `error`), default `info`.

use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;

use chrono::{SecondsFormat, Utc};

/// Environment variable selecting the minimum severity
pub const LOG_LEVEL_ENV: &str = "ADMISSIONS_LOG";

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues (rejected input, degraded reads)
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Process cannot continue
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse a level name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" | "warning" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: OnceLock<Severity> = OnceLock::new();

fn min_severity() -> Severity {
    *MIN_SEVERITY.get_or_init(|| {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| Severity::parse(&v))
            .unwrap_or(Severity::Info)
    })
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < min_severity() {
            return;
        }
        if severity >= Severity::Error {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::format_line(
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
            event,
            fields,
        );
        // Logging never fails the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn format_line(ts: &str, severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = format!(
            "{{\"ts\":{},\"event\":{},\"severity\":\"{}\"",
            quoted(ts),
            quoted(event),
            severity.as_str()
        );
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&quoted(key));
            line.push(':');
            line.push_str(&quoted(value));
        }
        line.push_str("}\n");
        line
    }
}

/// JSON string literal for `s`, quotes included
fn quoted(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> serde_json::Value {
        let out = Logger::format_line("2026-01-01T00:00:00.000Z", severity, event, fields);
        assert!(out.ends_with('\n'));
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warn));
        assert_eq!(Severity::parse("warning"), Some(Severity::Warn));
        assert_eq!(Severity::parse("debug"), None);
    }

    #[test]
    fn test_log_json_format() {
        let parsed = line(Severity::Info, "STUDENT_REGISTERED", &[("id", "abc")]);
        assert_eq!(parsed["event"], "STUDENT_REGISTERED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["id"], "abc");
        assert_eq!(parsed["ts"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_fields_sorted() {
        let out = Logger::format_line("t", Severity::Info, "E", &[("zeta", "1"), ("alpha", "2")]);
        let alpha = out.find("alpha").unwrap();
        let zeta = out.find("zeta").unwrap();
        assert!(alpha < zeta);
        assert!(out.find("event").unwrap() < alpha);
    }

    #[test]
    fn test_escaping() {
        let parsed = line(
            Severity::Error,
            "STORE_FAILURE",
            &[("reason", "said \"no\"\nthen\tquit\u{1}")],
        );
        assert_eq!(parsed["reason"], "said \"no\"\nthen\tquit\u{1}");
    }
}
