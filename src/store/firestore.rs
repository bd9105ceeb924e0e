//! # Firestore Document Store
//!
//! Talks to the Firestore REST API (v1) for one collection. Documents are
//! written as maps of `stringValue` fields; fetched fields of any other
//! type are skipped.
//!
//! Against the emulator, the base URL is plain HTTP on the emulator host and
//! requests carry the emulator's fixed bearer token.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{Document, DocumentStore, StoreError, StoreResult};
use crate::credentials::{ServiceAccountKey, TokenSource};

/// Production REST endpoint
pub const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";

/// Documents fetched per page when listing
pub const LIST_PAGE_SIZE: usize = 300;

/// Firestore REST client bound to one collection
pub struct FirestoreStore {
    client: reqwest::Client,
    /// `.../projects/{p}/databases/(default)/documents`
    documents_url: String,
    collection: String,
    tokens: TokenSource,
}

/// A document as returned by the REST API
#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

/// `documents` URL for a project on the given host
pub fn documents_url(host_url: &str, project_id: &str) -> String {
    format!(
        "{}/v1/projects/{}/databases/(default)/documents",
        host_url.trim_end_matches('/'),
        project_id
    )
}

/// Encode a document as a Firestore `{"fields": {...}}` body
pub fn encode_fields(fields: &Document) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), json!({ "stringValue": v })))
        .collect();
    json!({ "fields": encoded })
}

/// Decode Firestore fields, keeping only string values
pub fn decode_fields(fields: &Map<String, Value>) -> Document {
    fields
        .iter()
        .filter_map(|(k, v)| {
            v.get("stringValue")
                .and_then(Value::as_str)
                .map(|s| (k.clone(), s.to_string()))
        })
        .collect()
}

/// Document id: the last segment of a full resource name
pub fn id_from_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Ids that can address a document directly in this collection.
/// `.` and `..` are reserved and would resolve to another path.
fn is_addressable(id: &str) -> bool {
    !id.is_empty() && !id.contains('/') && id != "." && id != ".."
}

impl FirestoreStore {
    pub fn new(
        client: reqwest::Client,
        documents_url: impl Into<String>,
        collection: impl Into<String>,
        tokens: TokenSource,
    ) -> Self {
        Self {
            client,
            documents_url: documents_url.into(),
            collection: collection.into(),
            tokens,
        }
    }

    /// Hosted Firestore, authenticated as the service account
    pub fn hosted(
        client: reqwest::Client,
        project_id: &str,
        collection: impl Into<String>,
        key: ServiceAccountKey,
    ) -> Self {
        let tokens = TokenSource::service_account(key, client.clone());
        Self::new(
            client,
            documents_url(FIRESTORE_HOST, project_id),
            collection,
            tokens,
        )
    }

    /// Local emulator at `host:port`
    pub fn emulator(
        client: reqwest::Client,
        emulator_host: &str,
        project_id: &str,
        collection: impl Into<String>,
    ) -> Self {
        let host_url = format!("http://{}", emulator_host);
        Self::new(
            client,
            documents_url(&host_url, project_id),
            collection,
            TokenSource::Emulator,
        )
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    /// URL of one document; the id is percent-encoded as a single path segment
    pub fn document_url(&self, id: &str) -> StoreResult<Url> {
        let base = self.collection_url();
        let invalid = || StoreError::Unavailable(format!("invalid store url: {}", base));

        let mut url = Url::parse(&base).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(id);
        Ok(url)
    }

    async fn request<U: IntoUrl>(&self, method: Method, url: U) -> StoreResult<RequestBuilder> {
        let token = self.tokens.bearer().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> StoreResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn api_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
            _ => body,
        };
        StoreError::Api { status, message }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn put(&self, fields: Document) -> StoreResult<String> {
        let response = Self::send(
            self.request(Method::POST, self.collection_url())
                .await?
                .json(&encode_fields(&fields)),
        )
        .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let doc: WireDocument = Self::decode(response).await?;
        Ok(id_from_name(&doc.name).to_string())
    }

    async fn stream_all(&self) -> StoreResult<Vec<(String, Document)>> {
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = Self::send(
                self.request(Method::GET, self.collection_url())
                    .await?
                    .query(&query),
            )
            .await?;

            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }

            let page: ListDocumentsResponse = Self::decode(response).await?;
            out.extend(
                page.documents
                    .iter()
                    .map(|d| (id_from_name(&d.name).to_string(), decode_fields(&d.fields))),
            );

            let Some(token) = page.next_page_token.filter(|t| !t.is_empty()) else {
                break;
            };
            // A token seen before would page forever
            if !seen_tokens.insert(token.clone()) {
                break;
            }
            page_token = Some(token);
        }

        Ok(out)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        if !is_addressable(id) {
            return Ok(None);
        }

        let response = Self::send(self.request(Method::GET, self.document_url(id)?).await?).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let doc: WireDocument = Self::decode(response).await?;
        Ok(Some(decode_fields(&doc.fields)))
    }

    async fn merge(&self, id: &str, fields: Document) -> StoreResult<()> {
        if !is_addressable(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        // Only the supplied keys are touched; the document must already exist
        let mut query: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let response = Self::send(
            self.request(Method::PATCH, self.document_url(id)?)
                .await?
                .query(&query)
                .json(&encode_fields(&fields)),
        )
        .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if !is_addressable(id) {
            return Ok(());
        }

        let response =
            Self::send(self.request(Method::DELETE, self.document_url(id)?).await?).await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Self::api_error(response).await)
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_url() {
        assert_eq!(
            documents_url("https://firestore.googleapis.com/", "demo"),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents"
        );
    }

    #[test]
    fn test_emulator_urls() {
        let store =
            FirestoreStore::emulator(reqwest::Client::new(), "localhost:8080", "demo", "admissions");
        assert_eq!(
            store.collection_url(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/admissions"
        );
        assert!(store
            .document_url("abc")
            .unwrap()
            .as_str()
            .ends_with("/documents/admissions/abc"));
        assert_eq!(store.backend_name(), "firestore");
    }

    #[test]
    fn test_encode_fields() {
        let mut doc = Document::new();
        doc.insert("Name".into(), "Asha".into());
        let body = encode_fields(&doc);
        assert_eq!(body["fields"]["Name"]["stringValue"], "Asha");
    }

    #[test]
    fn test_decode_skips_non_string_values() {
        let fields: Map<String, Value> = serde_json::from_value(json!({
            "Name": {"stringValue": "Asha"},
            "Age": {"integerValue": "17"},
            "Stream": {"stringValue": "Science"}
        }))
        .unwrap();
        let doc = decode_fields(&fields);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["Stream"], "Science");
        assert!(!doc.contains_key("Age"));
    }

    #[test]
    fn test_id_from_name() {
        assert_eq!(
            id_from_name("projects/p/databases/(default)/documents/admissions/Xy12"),
            "Xy12"
        );
        assert_eq!(id_from_name("plain"), "plain");
    }

    #[test]
    fn test_addressable_ids() {
        assert!(is_addressable("abc123"));
        assert!(!is_addressable(""));
        assert!(!is_addressable("a/b"));
        assert!(!is_addressable("."));
        assert!(!is_addressable(".."));
        assert!(is_addressable("doc001?x"));
    }

    #[test]
    fn test_document_url_encodes_reserved_characters() {
        let store =
            FirestoreStore::emulator(reqwest::Client::new(), "localhost:8080", "demo", "admissions");
        let url = store.document_url("doc001?x").unwrap();
        assert!(url.path().ends_with("/documents/admissions/doc001%3Fx"));
        assert!(url.query().is_none());

        let url = store.document_url("doc002#frag").unwrap();
        assert!(url.path().ends_with("/admissions/doc002%23frag"));
        assert!(url.fragment().is_none());

        let url = store.document_url("50%off").unwrap();
        assert!(url.path().ends_with("/admissions/50%25off"));
    }

    #[tokio::test]
    async fn test_unaddressable_ids_short_circuit() {
        // Port 9 (discard) is never contacted: these return before any request
        let store =
            FirestoreStore::emulator(reqwest::Client::new(), "127.0.0.1:9", "demo", "admissions");
        assert!(store.get("a/b").await.unwrap().is_none());
        assert!(store.delete("").await.is_ok());
        assert!(matches!(
            store.merge("a/b", Document::new()).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
