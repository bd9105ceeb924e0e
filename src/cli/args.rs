//! CLI argument definitions using clap
//!
//! Commands:
//! - admissions serve    --config <path> [--port <n>]
//! - admissions list     --config <path>
//! - admissions show     --config <path> <id>
//! - admissions register --config <path>        (submission JSON on stdin)
//! - admissions update   --config <path> <id>   (submission JSON on stdin)
//! - admissions delete   --config <path> <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Admissions - student registration backed by a hosted document store
#[derive(Parser, Debug)]
#[command(name = "admissions")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print every registered student
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,
    },

    /// Print one student
    Show {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// Document id
        id: String,
    },

    /// Register a student from a JSON submission on stdin.
    ///
    /// One-shot commands need the firestore backend; `backend: memory` is
    /// only usable with `serve`.
    Register {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,
    },

    /// Replace a student's fields from a JSON submission on stdin
    Update {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// Document id
        id: String,
    },

    /// Delete a student (succeeds if already gone)
    Delete {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// Document id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
