//! CLI command implementations
//!
//! Every command loads the configuration, opens the store and runs one
//! registry operation on a fresh tokio runtime. One-shot commands print a
//! single JSON response line.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};
use crate::http_server::HttpServer;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::registry::{Lookup, Registry, StudentSubmission};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::List { config } => list(&config),
        Command::Show { config, id } => show(&config, &id),
        Command::Register { config } => register(&config),
        Command::Update { config, id } => update(&config, &id),
        Command::Delete { config, id } => delete(&config, &id),
    }
}

/// Start the HTTP API and serve until Ctrl-C
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event_with_fields(Event::BootStart, &[("command", "serve")]);

    let config = Config::load(config_path)?;
    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }

    let rt = runtime()?;
    rt.block_on(async {
        let registry = open_registry(&config)?;
        let server = HttpServer::with_config(http_config, registry);
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print every student. A store failure is reported inside the data.
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = load_for_one_shot(config_path, "list")?;
    let rt = runtime()?;
    let listing = rt.block_on(async {
        let registry = open_registry(&config)?;
        Ok::<_, CliError>(registry.list().await)
    })?;

    let count = listing.students.len();
    write_response(json!({
        "students": listing.students,
        "count": count,
        "error": listing.error,
    }))
}

pub fn show(config_path: &Path, id: &str) -> CliResult<()> {
    let config = load_for_one_shot(config_path, "show")?;
    let rt = runtime()?;
    let outcome = rt.block_on(async {
        let registry = open_registry(&config)?;
        Ok::<_, CliError>(registry.get(id).await)
    })?;

    match outcome {
        Ok(Lookup::Found(record)) => write_response(serde_json::to_value(record)?),
        Ok(Lookup::Absent) => fail(CliError::not_found(id)),
        Err(e) => fail(e.into()),
    }
}

/// Register a student from the submission on stdin
pub fn register(config_path: &Path) -> CliResult<()> {
    let config = load_for_one_shot(config_path, "register")?;
    let submission = read_submission()?;

    let rt = runtime()?;
    let outcome = rt.block_on(async {
        let registry = open_registry(&config)?;
        Ok::<_, CliError>(registry.create(&submission).await)
    })?;

    match outcome {
        Ok(record) => write_response(serde_json::to_value(record)?),
        Err(e) => fail(e.into()),
    }
}

/// Replace a student's fields with the submission on stdin
pub fn update(config_path: &Path, id: &str) -> CliResult<()> {
    let config = load_for_one_shot(config_path, "update")?;
    let submission = read_submission()?;

    let rt = runtime()?;
    let outcome = rt.block_on(async {
        let registry = open_registry(&config)?;
        Ok::<_, CliError>(registry.update(id, &submission).await)
    })?;

    match outcome {
        Ok(record) => write_response(serde_json::to_value(record)?),
        Err(e) => fail(e.into()),
    }
}

pub fn delete(config_path: &Path, id: &str) -> CliResult<()> {
    let config = load_for_one_shot(config_path, "delete")?;
    let rt = runtime()?;
    let outcome = rt.block_on(async {
        let registry = open_registry(&config)?;
        Ok::<_, CliError>(registry.delete(id).await)
    })?;

    match outcome {
        Ok(()) => write_response(json!({ "id": id, "deleted": true })),
        Err(e) => fail(e.into()),
    }
}

/// Load the config for a command that runs once and exits
fn load_for_one_shot(config_path: &Path, command: &str) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    config.require_persistent_store(command)?;
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Must run inside the runtime; the HTTP client binds to it
fn open_registry(config: &Config) -> CliResult<Arc<Registry>> {
    let store = config.build_store()?;
    Ok(Arc::new(Registry::new(
        store,
        Arc::new(MetricsRegistry::new()),
    )))
}

fn read_submission() -> CliResult<StudentSubmission> {
    submission_from_value(read_request()?)
}

fn submission_from_value(value: Value) -> CliResult<StudentSubmission> {
    if !value.is_object() {
        return Err(CliError::io_error("Submission must be a JSON object"));
    }
    Ok(serde_json::from_value(value)?)
}

/// Report the error on stdout, then hand it back for the exit code
fn fail(err: CliError) -> CliResult<()> {
    write_error(err.code_str(), err.message())?;
    Err(err)
}
