//! Firestore REST API client.
//!
//! Client with:
//! - Token caching with refresh margin
//! - HTTP client tuning (pooling, timeouts)
//! - Emulator support via `FIRESTORE_EMULATOR_HOST`
//! - Observability (tracing spans, metrics)
//!
//! Calls are not retried. The only re-send happens when the API rejects the
//! access token as expired.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::{record_query_results, record_request};
use crate::token_cache::TokenCache;
use crate::types::{Document, Fields, RunQueryRequest, RunQueryResponse, StructuredQuery};

/// Bearer token the Firestore emulator accepts.
const EMULATOR_TOKEN: &str = "owner";

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// `host:port` of a local emulator; disables OAuth when set
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                FirestoreError::config_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(FirestoreError::config_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            emulator_host: std::env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .filter(|h| !h.is_empty()),
        })
    }

    /// Documents root URL for this project and database.
    pub fn base_url(&self) -> String {
        let root = match &self.emulator_host {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("http://{}", host),
            None => "https://firestore.googleapis.com".to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            root, self.project_id, self.database_id
        )
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Clone)]
enum Auth {
    Oauth(Arc<TokenCache>),
    Emulator,
}

/// Firestore REST API client.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    auth: Auth,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let auth = match config.emulator_host {
            Some(_) => Auth::Emulator,
            None => Auth::Oauth(Arc::new(TokenCache::new(Self::create_auth_provider()?))),
        };

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("clipforge-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            auth,
        })
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_token(&self) -> FirestoreResult<String> {
        match &self.auth {
            Auth::Oauth(cache) => cache.get_token().await,
            Auth::Emulator => Ok(EMULATOR_TOKEN.to_string()),
        }
    }

    async fn invalidate_token(&self) {
        if let Auth::Oauth(cache) = &self.auth {
            cache.invalidate().await;
        }
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Build document path. The id is percent-encoded as one path segment.
    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        )
    }

    /// Send a request built by `build` with a bearer token, sending it once
    /// more with a new token if the first one was rejected as expired.
    async fn send_authorized<B>(&self, url: &str, build: B) -> FirestoreResult<Response>
    where
        B: Fn(&str) -> RequestBuilder,
    {
        let token = self.get_token().await?;
        let response = build(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(FirestoreError::from_http_status(
                StatusCode::UNAUTHORIZED.as_u16(),
                format!("{} failed: {}", url, body),
            ));
        }

        debug!("Access token expired, refreshing");
        self.invalidate_token().await;
        let token = self.get_token().await?;
        Ok(build(&token).send().await?)
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Get a document, `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_path(collection, doc_id);

        self.execute_request("get_document", collection, Some(doc_id), async {
            let response = self
                .send_authorized(&url, |token| self.http.get(&url).bearer_auth(token))
                .await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create a document with an explicit id; fails if it already exists.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Fields,
    ) -> FirestoreResult<Document> {
        let url = format!(
            "{}/{}?documentId={}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        );
        let body = Document::new(fields);

        self.execute_request("create_document", collection, Some(doc_id), async {
            let response = self
                .send_authorized(&url, |token| {
                    self.http.post(&url).bearer_auth(token).json(&body)
                })
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                    "{}/{}",
                    collection, doc_id
                ))),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Run a structured query against the documents root.
    pub async fn run_query(&self, query: StructuredQuery) -> FirestoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();
        let request = RunQueryRequest {
            structured_query: query,
        };

        self.execute_request("run_query", &collection, None, async {
            let response = self
                .send_authorized(&url, |token| {
                    self.http.post(&url).bearer_auth(token).json(&request)
                })
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await.unwrap_or_default();
                    // runQuery returns a JSON array of RunQueryResponse objects
                    let responses: Vec<RunQueryResponse> =
                        serde_json::from_str(&body).map_err(|e| {
                            FirestoreError::InvalidResponse(format!(
                                "Failed to parse runQuery response: {} (body prefix: {})",
                                e,
                                body.chars().take(200).collect::<String>()
                            ))
                        })?;

                    let docs: Vec<Document> =
                        responses.into_iter().filter_map(|r| r.document).collect();
                    record_query_results(&collection, docs.len());
                    Ok(docs)
                }
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = match doc_id {
            Some(id) => {
                info_span!("firestore_request", operation = %operation, collection = %collection, doc_id = %id)
            }
            None => info_span!("firestore_request", operation = %operation, collection = %collection),
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: Response) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
