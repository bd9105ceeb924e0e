//! Bind address and CORS settings for the registration API.
//!
//! Read from the `http` object of `admissions.json`; every key is optional.

use serde::{Deserialize, Serialize};

/// Port the API listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        let local_origin = |host: &str| format!("http://{}:{}", host, DEFAULT_PORT);
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec![local_origin("localhost"), local_origin("127.0.0.1")],
        }
    }
}

impl HttpServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// `host:port`, as handed to the listener
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_local_frontend() {
        let config = HttpServerConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8000");
        assert!(config
            .cors_origins
            .contains(&"http://localhost:8000".to_string()));
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_with_port_keeps_other_defaults() {
        let config = HttpServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let config: HttpServerConfig =
            serde_json::from_str(r#"{"port": 9000, "cors_origins": []}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.allows_any_origin());
    }
}
