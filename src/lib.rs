//! admissions - student registration over a hosted document store
//!
//! The [`registry`] validates submissions and drives the record
//! lifecycle against any [`store::DocumentStore`]; [`http_server`] and
//! [`cli`] are the two ways in.

pub mod cli;
pub mod credentials;
pub mod http_server;
pub mod observability;
pub mod registry;
pub mod store;
