//! Configuration file loading
//!
//! `admissions.json` selects the document store backend and the HTTP
//! settings. Environment variables override the file after it is parsed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::credentials::{self, CredentialSource, CREDENTIALS_JSON_ENV, CREDENTIALS_PATH_ENV};
use crate::http_server::HttpServerConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::store::{DocumentStore, FirestoreStore, InMemoryStore};

/// Points the Firestore client at a local emulator (`host:port`)
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Project id used against the emulator when none is configured
pub const EMULATOR_DEFAULT_PROJECT: &str = "demo-admissions";

/// Which document store the registry talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Firestore,
    Memory,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    /// Collection holding one document per student
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Falls back to the service account's project
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    #[serde(default)]
    pub emulator_host: Option<String>,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Service-account JSON taken from the environment, never from the file
    #[serde(skip)]
    pub inline_credentials: Option<String>,
}

fn default_collection() -> String {
    "admissions".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("serviceAccountKey.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            collection: default_collection(),
            project_id: None,
            credentials_path: default_credentials_path(),
            emulator_host: None,
            http: HttpServerConfig::default(),
            inline_credentials: None,
        }
    }
}

impl Config {
    /// Load configuration from file, apply environment overrides and validate
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::parse(&content)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        let shown = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", shown.as_str()),
                ("backend", config.backend_str()),
                ("collection", config.collection.as_str()),
            ],
        );

        Ok(config)
    }

    /// Parse without overrides or validation
    pub fn parse(content: &str) -> CliResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Apply overrides from `lookup`, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = set(EMULATOR_HOST_ENV) {
            self.emulator_host = Some(host);
        }
        if let Some(path) = set(CREDENTIALS_PATH_ENV) {
            self.credentials_path = PathBuf::from(path);
        }
        if let Some(json) = set(CREDENTIALS_JSON_ENV) {
            self.inline_credentials = Some(json);
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.collection.is_empty() {
            return Err(CliError::config_error("collection must not be empty"));
        }
        if self.collection.contains('/') {
            return Err(CliError::config_error(format!(
                "Invalid collection: '{}'. Must not contain '/'.",
                self.collection
            )));
        }
        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }
        if let Some(host) = &self.emulator_host {
            if host.contains("://") {
                return Err(CliError::config_error(format!(
                    "Invalid emulator_host: '{}'. Expected host:port without a scheme.",
                    host
                )));
            }
        }
        if self.needs_credentials()
            && self.inline_credentials.is_none()
            && self.credentials_path.as_os_str().is_empty()
        {
            return Err(CliError::config_error(
                "credentials_path is required for the firestore backend",
            ));
        }
        Ok(())
    }

    pub fn backend_str(&self) -> &'static str {
        match self.backend {
            Backend::Firestore => "firestore",
            Backend::Memory => "memory",
        }
    }

    /// One-shot commands need a store that outlives the process
    pub fn require_persistent_store(&self, command: &str) -> CliResult<()> {
        if self.backend == Backend::Memory {
            return Err(CliError::config_error(format!(
                "'{}' needs the firestore backend; the memory backend only lives as long as 'serve'",
                command
            )));
        }
        Ok(())
    }

    /// Hosted Firestore is the only backend that signs in
    pub fn needs_credentials(&self) -> bool {
        self.backend == Backend::Firestore && self.emulator_host.is_none()
    }

    /// Inline JSON wins over the key file
    pub fn credential_source(&self) -> CredentialSource {
        match &self.inline_credentials {
            Some(json) => CredentialSource::Inline(json.clone()),
            None => CredentialSource::File(self.credentials_path.clone()),
        }
    }

    /// Open the configured document store
    pub fn build_store(&self) -> CliResult<Arc<dyn DocumentStore>> {
        match self.backend {
            Backend::Memory => Ok(Arc::new(InMemoryStore::new())),
            Backend::Firestore => {
                let client = reqwest::Client::builder()
                    .build()
                    .map_err(|e| CliError::boot_failed(format!("HTTP client: {}", e)))?;

                if let Some(host) = &self.emulator_host {
                    let project = self
                        .project_id
                        .as_deref()
                        .unwrap_or(EMULATOR_DEFAULT_PROJECT);
                    return Ok(Arc::new(FirestoreStore::emulator(
                        client,
                        host,
                        project,
                        self.collection.clone(),
                    )));
                }

                let source = self.credential_source();
                let key = match credentials::initialize(&source) {
                    Ok(key) => key,
                    Err(e) => {
                        let described = source.describe();
                        let reason = e.to_string();
                        log_event_with_fields(
                            Event::CredentialsFailed,
                            &[("source", described.as_str()), ("reason", reason.as_str())],
                        );
                        return Err(e.into());
                    }
                };
                log_event_with_fields(
                    Event::CredentialsLoaded,
                    &[("client_email", key.client_email.as_str())],
                );

                let project = self
                    .project_id
                    .clone()
                    .unwrap_or_else(|| key.project_id.clone());
                if project.is_empty() {
                    return Err(CliError::config_error("project_id could not be resolved"));
                }

                Ok(Arc::new(FirestoreStore::hosted(
                    client,
                    &project,
                    self.collection.clone(),
                    key.clone(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_from_empty_object() {
        let config = Config::parse("{}").unwrap();
        assert_eq!(config.backend, Backend::Firestore);
        assert_eq!(config.collection, "admissions");
        assert_eq!(config.credentials_path, PathBuf::from("serviceAccountKey.json"));
        assert_eq!(config.http.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_and_port() {
        let config =
            Config::parse(r#"{"backend":"memory","http":{"port":9100}}"#).unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.http.host, "0.0.0.0");
        assert!(!config.needs_credentials());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::parse(r#"{"backend":"sqlite"}"#).unwrap_err();
        assert!(err.message().contains("Invalid config JSON"));
    }

    #[test]
    fn test_collection_with_slash_rejected() {
        let config = Config::parse(r#"{"collection":"a/b"}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = Config::parse(r#"{"http":{"port":0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_emulator_host_with_scheme_rejected() {
        let config = Config::parse(r#"{"emulator_host":"http://localhost:8080"}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            (EMULATOR_HOST_ENV, "localhost:8080"),
            (CREDENTIALS_PATH_ENV, "/etc/key.json"),
        ]));
        assert_eq!(config.emulator_host.as_deref(), Some("localhost:8080"));
        assert_eq!(config.credentials_path, PathBuf::from("/etc/key.json"));
        assert!(!config.needs_credentials());
        assert!(matches!(config.credential_source(), CredentialSource::File(_)));
    }

    #[test]
    fn test_inline_credentials_preferred() {
        let mut config = Config::default();
        config.apply_overrides(env(&[(CREDENTIALS_JSON_ENV, "{\"type\":\"x\"}")]));
        assert!(matches!(
            config.credential_source(),
            CredentialSource::Inline(ref json) if json.contains("type")
        ));
    }

    #[test]
    fn test_blank_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[(EMULATOR_HOST_ENV, "  ")]));
        assert!(config.emulator_host.is_none());
    }

    #[test]
    fn test_memory_backend_is_not_persistent() {
        let memory = Config {
            backend: Backend::Memory,
            ..Default::default()
        };
        let err = memory.require_persistent_store("register").unwrap_err();
        assert_eq!(err.code_str(), "ADMISSIONS_CLI_CONFIG_ERROR");
        assert!(err.message().contains("'register'"));

        assert!(Config::default().require_persistent_store("register").is_ok());
    }

    #[test]
    fn test_memory_store_builds() {
        let config = Config {
            backend: Backend::Memory,
            ..Default::default()
        };
        let store = config.build_store().unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_emulator_store_builds_without_credentials() {
        let config = Config {
            emulator_host: Some("127.0.0.1:8080".to_string()),
            ..Default::default()
        };
        let store = config.build_store().unwrap();
        assert_eq!(store.backend_name(), "firestore");
    }
}
