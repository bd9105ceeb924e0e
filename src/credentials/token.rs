//! # OAuth2 Access Tokens
//!
//! Service-account flow: sign a short-lived RS256 JWT assertion with the
//! account's private key, trade it at the token endpoint for a bearer
//! token, and reuse that token until shortly before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{CredentialsError, CredentialsResult, ServiceAccountKey};

/// OAuth2 scope granting Firestore access
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Grant type for the JWT bearer flow
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Fixed bearer token the Firestore emulator accepts
pub const EMULATOR_TOKEN: &str = "owner";

/// Assertion lifetime (Google caps this at one hour)
const ASSERTION_TTL_SECS: i64 = 3600;

/// Refresh this long before the cached token expires
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the signed assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Service account email
    pub iss: String,
    /// Requested scope
    pub scope: String,
    /// Token endpoint
    pub aud: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

/// A bearer token and when it stops working
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Usable for at least the refresh margin from `now`
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Supplies the `Authorization` bearer token for store requests
pub enum TokenSource {
    /// Talking to the local emulator; no real credentials involved
    Emulator,
    /// Service-account JWT bearer flow
    ServiceAccount(ServiceAccountTokens),
}

impl TokenSource {
    pub fn service_account(key: ServiceAccountKey, client: reqwest::Client) -> Self {
        TokenSource::ServiceAccount(ServiceAccountTokens::new(key, client))
    }

    /// Current bearer token, fetching a new one if needed
    pub async fn bearer(&self) -> CredentialsResult<String> {
        match self {
            TokenSource::Emulator => Ok(EMULATOR_TOKEN.to_string()),
            TokenSource::ServiceAccount(tokens) => tokens.bearer().await,
        }
    }
}

/// Token cache for one service account
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey, client: reqwest::Client) -> Self {
        Self {
            key,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Pre-seed the cache (for testing)
    #[cfg(test)]
    pub fn with_cached(key: ServiceAccountKey, token: AccessToken) -> Self {
        Self {
            key,
            client: reqwest::Client::new(),
            cached: Mutex::new(Some(token)),
        }
    }

    /// Sign the JWT assertion for the given instant
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> CredentialsResult<String> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: DATASTORE_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        if !self.key.private_key_id.is_empty() {
            header.kid = Some(self.key.private_key_id.clone());
        }

        encode(&header, &claims, &self.key.encoding_key()?)
            .map_err(|e| CredentialsError::InvalidKey(format!("signing failed: {}", e)))
    }

    /// Current bearer token. Holds the cache lock across the exchange so
    /// concurrent callers share one refresh.
    pub async fn bearer(&self) -> CredentialsResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.is_fresh_at(now) {
                return Ok(token.token.clone());
            }
        }

        let token = self.exchange(now).await?;
        let bearer = token.token.clone();
        *cached = Some(token);
        Ok(bearer)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> CredentialsResult<AccessToken> {
        let assertion = self.sign_assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CredentialsError::TokenExchange(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialsError::TokenExchange(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialsError::TokenExchange(format!("bad response: {}", e)))?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const FIXTURE: &str = include_str!("../../tests/fixtures/service_account.json");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_public_key.pem");

    fn key() -> ServiceAccountKey {
        ServiceAccountKey::from_json(FIXTURE).unwrap()
    }

    #[test]
    fn test_assertion_verifies_with_public_key() {
        let tokens = ServiceAccountTokens::new(key(), reqwest::Client::new());
        let assertion = tokens.sign_assertion(Utc::now()).unwrap();

        let header = decode_header(&assertion).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("0123456789abcdef"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[super::super::DEFAULT_TOKEN_URI]);
        let decoded = decode::<AssertionClaims>(
            &assertion,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        let claims = decoded.claims;
        assert_eq!(
            claims.iss,
            "registrar@admissions-test.iam.gserviceaccount.com"
        );
        assert_eq!(claims.scope, DATASTORE_SCOPE);
        assert_eq!(claims.exp - claims.iat, ASSERTION_TTL_SECS);
    }

    #[test]
    fn test_freshness_margin() {
        let now = Utc::now();
        let token = AccessToken {
            token: "t".into(),
            expires_at: now + Duration::seconds(REFRESH_MARGIN_SECS + 5),
        };
        assert!(token.is_fresh_at(now));
        assert!(!token.is_fresh_at(now + Duration::seconds(10)));
    }

    #[tokio::test]
    async fn test_fresh_cached_token_is_reused() {
        let cached = AccessToken {
            token: "cached-token".into(),
            expires_at: Utc::now() + Duration::minutes(30),
        };
        let source = TokenSource::ServiceAccount(ServiceAccountTokens::with_cached(key(), cached));
        assert_eq!(source.bearer().await.unwrap(), "cached-token");
    }

    #[tokio::test]
    async fn test_emulator_token() {
        assert_eq!(TokenSource::Emulator.bearer().await.unwrap(), "owner");
    }
}
