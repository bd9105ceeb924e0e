//! Submission validator
//!
//! Rules are checked in a fixed order and the first failure wins:
//! 1. email suffix
//! 2. contact number format
//! 3. completeness of all five fields
//!
//! Validation is purely structural on the raw input. Nothing is trimmed,
//! case-folded or reformatted.

use super::errors::ValidationError;
use super::record::{StudentFields, StudentSubmission};

/// Top-level domains accepted after the final `.` of an email
pub const ALLOWED_EMAIL_SUFFIXES: [&str; 2] = ["com", "in"];

/// Required prefix of a contact number
pub const CONTACT_PREFIX: &str = "+91";

/// Exact length of a contact number including the prefix
pub const CONTACT_LENGTH: usize = 13;

/// Email check: contains `@` and `.`, and the text after the last `.` is
/// exactly one of the allowed suffixes.
pub fn check_email(email: &str) -> bool {
    if !email.contains('@') || !email.contains('.') {
        return false;
    }
    match email.rsplit('.').next() {
        Some(suffix) => ALLOWED_EMAIL_SUFFIXES.contains(&suffix),
        None => false,
    }
}

/// Contact check: `+91` followed by ASCII digits only, 13 bytes in total.
pub fn check_contact(contact: &str) -> bool {
    match contact.strip_prefix(CONTACT_PREFIX) {
        Some(digits) => {
            contact.len() == CONTACT_LENGTH && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Validate a raw submission, returning the owned field set on success.
pub fn validate(submission: &StudentSubmission) -> Result<StudentFields, ValidationError> {
    let email = submission.email.as_deref().unwrap_or_default();
    if submission.email.is_none() || !check_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    let contact = submission.contact.as_deref().unwrap_or_default();
    if submission.contact.is_none() || !check_contact(contact) {
        return Err(ValidationError::InvalidContact);
    }

    let name = required(&submission.name, "name")?;
    let email = required(&submission.email, "email")?;
    let contact = required(&submission.contact, "contact")?;
    let gender = required(&submission.gender, "gender")?;
    let stream = required(&submission.stream, "stream")?;

    Ok(StudentFields {
        name,
        email,
        contact,
        gender,
        stream,
    })
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(ValidationError::MissingField(field)),
    }
}
