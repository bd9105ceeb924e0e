//! CLI module for the admissions service
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP API
//! - list / show: Read registered students
//! - register / update: Write a submission read from stdin
//! - delete: Remove a student

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{delete, list, register, run, run_command, serve, show, update};
pub use config::{Backend, Config, EMULATOR_DEFAULT_PROJECT, EMULATOR_HOST_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response};
