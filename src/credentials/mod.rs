//! # Service Account Credentials
//!
//! Loads the Google service-account key used to talk to Firestore, either
//! from a JSON key file or from JSON held in an environment variable.
//!
//! Loading happens once per process through [`initialize`]. Later calls
//! return the key that is already installed without touching the source
//! again.

pub mod token;

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use thiserror::Error;

pub use token::{AccessToken, TokenSource};

/// Environment variable holding inline service-account JSON
pub const CREDENTIALS_JSON_ENV: &str = "ADMISSIONS_CREDENTIALS_JSON";

/// Environment variable naming a service-account key file
pub const CREDENTIALS_PATH_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Default OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Result type for credential operations
pub type CredentialsResult<T> = Result<T, CredentialsError>;

/// Credential loading and token errors
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// No credentials source configured
    #[error("no service account credentials configured")]
    Missing,

    /// Key file could not be read
    #[error("failed to read credentials file {path}: {reason}")]
    Read { path: String, reason: String },

    /// Key JSON is malformed
    #[error("invalid service account JSON: {0}")]
    Parse(String),

    /// Key JSON parsed but is unusable
    #[error("invalid service account key: {0}")]
    InvalidKey(String),

    /// Token endpoint refused or could not be reached
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
}

/// Where the service-account key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Path to a JSON key file
    File(PathBuf),
    /// The key JSON itself
    Inline(String),
}

impl CredentialSource {
    /// Read and parse the key
    pub fn load(&self) -> CredentialsResult<ServiceAccountKey> {
        let raw = match self {
            CredentialSource::File(path) => {
                fs::read_to_string(path).map_err(|e| CredentialsError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
            CredentialSource::Inline(json) => json.clone(),
        };
        ServiceAccountKey::from_json(&raw)
    }

    /// Short description for logs (never includes key material)
    pub fn describe(&self) -> String {
        match self {
            CredentialSource::File(path) => format!("file:{}", path.display()),
            CredentialSource::Inline(_) => format!("env:{}", CREDENTIALS_JSON_ENV),
        }
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service-account key file contents
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse and check a key from its JSON form
    pub fn from_json(raw: &str) -> CredentialsResult<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(raw).map_err(|e| CredentialsError::Parse(e.to_string()))?;
        key.check()?;
        Ok(key)
    }

    fn check(&self) -> CredentialsResult<()> {
        if self.key_type != "service_account" {
            return Err(CredentialsError::InvalidKey(format!(
                "expected type 'service_account', got '{}'",
                self.key_type
            )));
        }
        if self.client_email.is_empty() {
            return Err(CredentialsError::InvalidKey(
                "client_email is empty".to_string(),
            ));
        }
        self.encoding_key()?;
        Ok(())
    }

    /// RSA signing key for the JWT assertion
    pub fn encoding_key(&self) -> CredentialsResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| CredentialsError::InvalidKey(format!("private_key: {}", e)))
    }
}

/// The process-wide key, set at most once
static INSTALLED: OnceLock<ServiceAccountKey> = OnceLock::new();

/// Load credentials once for the whole process.
///
/// The first successful call reads `source` and installs the key; every
/// later call returns the installed key and ignores its argument. A failed
/// load installs nothing, so a later call may try again.
pub fn initialize(source: &CredentialSource) -> CredentialsResult<&'static ServiceAccountKey> {
    if let Some(key) = INSTALLED.get() {
        return Ok(key);
    }
    let key = source.load()?;
    Ok(INSTALLED.get_or_init(|| key))
}

/// Whether [`initialize`] has installed a key
pub fn is_initialized() -> bool {
    INSTALLED.get().is_some()
}

/// The installed key, if any
pub fn installed() -> Option<&'static ServiceAccountKey> {
    INSTALLED.get()
}
