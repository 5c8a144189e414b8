//! Elasticsearch index client
//!
//! Only the three calls an archive run needs: index existence, index
//! creation from a mapping file, and bulk ingest of an NDJSON body.

use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Sink Trait
// ============================================================================

/// Destination for bulk bodies
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Create `index` from the mapping at `mapping` unless it exists.
    /// Returns whether the index was created.
    async fn ensure_index(&self, index: &str, mapping: &Path) -> Result<bool>;

    /// Send one NDJSON bulk body to `index`
    async fn bulk(&self, index: &str, body: Bytes) -> Result<BulkSummary>;
}

// ============================================================================
// Bulk Response
// ============================================================================

/// Outcome of one bulk request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// Number of item results returned
    pub items: usize,
    /// Items the cluster rejected
    pub failed: usize,
    /// Server-side processing time in milliseconds
    pub took_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BulkResponse {
    took: u64,
    errors: bool,
    items: Vec<Value>,
}

impl BulkResponse {
    /// First error reason, for logging
    fn first_error(&self) -> Option<String> {
        self.items.iter().find_map(|item| {
            item.as_object()?
                .values()
                .find_map(|action| action.get("error"))
                .map(|e| match e.get("reason").and_then(Value::as_str) {
                    Some(reason) => reason.to_string(),
                    None => e.to_string(),
                })
        })
    }

    fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| {
                item.as_object()
                    .is_some_and(|actions| actions.values().any(|a| a.get("error").is_some()))
            })
            .count()
    }
}

// ============================================================================
// Elastic Client
// ============================================================================

/// Minimal Elasticsearch REST client
pub struct ElasticClient {
    host: Url,
    http_client: HttpClient,
}

impl ElasticClient {
    /// Create a client for `host`, e.g. `http://estc:9200`
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let host = Url::parse(host)?;
        let config = HttpClientConfig::builder()
            .base_url(host.as_str())
            .timeout(timeout)
            .build();
        Ok(Self {
            host,
            http_client: HttpClient::with_config(config)?,
        })
    }

    /// Create a client with a preconfigured HTTP client. The client's base
    /// URL is used as the host.
    pub fn with_client(http_client: HttpClient) -> Result<Self> {
        let base = http_client
            .config()
            .base_url
            .clone()
            .ok_or_else(|| Error::config("Elasticsearch client needs a base URL"))?;
        Ok(Self {
            host: Url::parse(&base)?,
            http_client,
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Whether `index` exists
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let path = index_path(index, None)?;
        let response = self
            .http_client
            .get_with_config(&path, RequestConfig::new().passthrough_status())
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::http_status(status.as_u16(), body))
            }
        }
    }

    /// Create `index` with the given settings/mappings document
    pub async fn create_index(&self, index: &str, mapping: impl Into<Bytes>) -> Result<()> {
        let path = index_path(index, None)?;
        let config = RequestConfig::new()
            .raw(mapping, JSON_CONTENT_TYPE)
            .passthrough_status();

        let response = self.http_client.request(Method::PUT, &path, config).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        info!(index, "Created index");
        Ok(())
    }

    /// Create `index` from a mapping file
    pub async fn create_index_from_file(&self, index: &str, mapping: &Path) -> Result<()> {
        let body = tokio::fs::read(mapping)
            .await
            .map_err(|e| Error::read_failed(mapping, e))?;
        self.create_index(index, body).await
    }

    /// Post an NDJSON body to `<index>/_bulk`
    pub async fn bulk(&self, index: &str, body: Bytes) -> Result<BulkSummary> {
        let path = index_path(index, Some("_bulk"))?;
        let size = body.len();
        // Documents get server-generated ids, so a resent body indexes them twice
        let config = RequestConfig::new()
            .raw(body, NDJSON_CONTENT_TYPE)
            .retries(0);

        let bytes = self
            .http_client
            .request_bytes(Method::POST, &path, config)
            .await?;

        let response: BulkResponse = match serde_json::from_slice(&bytes) {
            Ok(response) => response,
            Err(e) => {
                warn!("Unreadable bulk response: {e}");
                BulkResponse::default()
            }
        };

        let summary = BulkSummary {
            items: response.items.len(),
            failed: response.failed(),
            took_ms: response.took,
        };

        if response.errors {
            warn!(
                index,
                failed = summary.failed,
                items = summary.items,
                "Bulk request reported item errors: {}",
                response.first_error().unwrap_or_default()
            );
        } else {
            debug!(index, bytes = size, items = summary.items, "Bulk request accepted");
        }

        Ok(summary)
    }
}

#[async_trait]
impl IndexSink for ElasticClient {
    async fn ensure_index(&self, index: &str, mapping: &Path) -> Result<bool> {
        if self.index_exists(index).await? {
            debug!(index, "Index exists");
            return Ok(false);
        }
        self.create_index_from_file(index, mapping).await?;
        Ok(true)
    }

    async fn bulk(&self, index: &str, body: Bytes) -> Result<BulkSummary> {
        ElasticClient::bulk(self, index, body).await
    }
}

impl std::fmt::Debug for ElasticClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticClient")
            .field("host", &self.host.as_str())
            .finish_non_exhaustive()
    }
}

/// Relative request path for an index, rejecting names that would escape it
fn index_path(index: &str, endpoint: Option<&str>) -> Result<String> {
    if index.is_empty() || index.contains('/') || index.starts_with('_') {
        return Err(Error::invalid_value(
            "index",
            format!("'{index}' is not a valid index name"),
        ));
    }
    Ok(match endpoint {
        Some(endpoint) => format!("/{index}/{endpoint}"),
        None => format!("/{index}"),
    })
}
