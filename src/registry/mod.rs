//! # Student Registry
//!
//! Validation rules and the record lifecycle for the admissions
//! collection. The store is injected; nothing here knows which backend
//! is in use.

pub mod errors;
pub mod lifecycle;
pub mod record;
pub mod validator;

pub use errors::{ErrorResponse, RegistryError, RegistryResult, ValidationError};
pub use lifecycle::{Lookup, Registry, StudentList};
pub use record::{StudentFields, StudentRecord, StudentSubmission};
pub use validator::{check_contact, check_email, validate};
