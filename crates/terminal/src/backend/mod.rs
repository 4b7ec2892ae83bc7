//! HTTP client for the sales backend.
//!
//! Uses `reqwest` 0.13 for HTTP. Product lists are cached per search query
//! using `moka`, with the TTL taken from [`BackendConfig::catalog_ttl`]. A
//! completed sale invalidates the cache.

mod catalog;
mod closing;
mod sales;
pub mod types;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use tillpoint_core::{InvoiceId, Product};

use crate::config::BackendConfig;

pub use sales::SaleError;
pub use types::{
    ClosingOutcome, ClosingStatus, ClosingSummary, DocumentType, SaleConfirmation,
    SaleLineRequest, SaleRequest,
};

/// Errors that can occur when talking to the sales backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend answered `success: false`.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response parsed but is missing required data.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the sales backend.
///
/// Cheap to clone; clones share the HTTP connection pool, the product cache
/// and the in-flight submission flag.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<String, Vec<Product>>,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        if let Some(token) = &config.api_token {
            headers.insert("Authorization", bearer(token)?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(64)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
                in_flight: AtomicBool::new(false),
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Printable receipt page for an invoice.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the URL cannot be built.
    pub fn receipt_url(&self, invoice_id: InvoiceId) -> Result<Url, BackendError> {
        self.endpoint(&format!("invoices/{invoice_id}/print"))
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Read a JSON body, mapping non-success statuses to `BackendError::Api`.
    ///
    /// Error bodies of the form `{"error": "..."}` contribute their message.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status for {what}"
            );
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| text.chars().take(200).collect());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response for {what}"
            );
            BackendError::Parse(e)
        })
    }
}

fn bearer(token: &SecretString) -> Result<HeaderValue, BackendError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|e| BackendError::Malformed(format!("Invalid API token format: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_url() {
        let config = BackendConfig::new("http://pos.local:5000/api").unwrap();
        let client = BackendClient::new(&config).unwrap();

        assert_eq!(
            client.receipt_url(InvoiceId::new(42)).unwrap().as_str(),
            "http://pos.local:5000/api/invoices/42/print"
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        let mut config = BackendConfig::new("http://pos.local").unwrap();
        config.api_token = Some(SecretString::from("bad\ntoken"));

        assert!(matches!(
            BackendClient::new(&config),
            Err(BackendError::Malformed(_))
        ));
    }
}
