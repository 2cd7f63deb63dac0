//! Remote model-catalog discovery.
//!
//! `GET {baseUrl}/models` with a bearer credential, bounded by a timeout.
//! Every failure is absorbed: callers always get a usable model list.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use super::{describe_model, fallback_models, select_default_model, ModelDescriptor};

/// Why discovery fell back to the static list.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("catalog response is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog response has no `data` array")]
    MissingData,
    #[error("catalog lists no usable models")]
    Empty,
    #[error("catalog request timed out after {0:?}")]
    Timeout(Duration),
}

/// Where a resolved list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// Models to configure plus the default selection among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCatalog {
    pub models: Vec<ModelDescriptor>,
    pub default_model: String,
    pub source: CatalogSource,
}

impl ResolvedCatalog {
    /// The static list with its default selection.
    pub fn fallback() -> Self {
        let models = fallback_models();
        Self {
            default_model: select_default_model(&models),
            models,
            source: CatalogSource::Fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: Option<String>,
    name: Option<String>,
    context_length: Option<u64>,
}

/// Discovers models behind an OpenAI-compatible gateway.
#[derive(Debug, Clone)]
pub struct ModelCatalogResolver {
    client: Client,
    timeout: Duration,
}

impl ModelCatalogResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Resolve the model list for `base_url`, falling back to the static
    /// list on any error.
    pub async fn resolve(&self, base_url: &str, api_key: &str) -> ResolvedCatalog {
        match self.fetch(base_url, api_key).await {
            Ok(models) => {
                info!(count = models.len(), "discovered models from catalog");
                ResolvedCatalog {
                    default_model: select_default_model(&models),
                    models,
                    source: CatalogSource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, "model discovery failed, using fallback list");
                ResolvedCatalog::fallback()
            }
        }
    }

    /// One bounded request against the catalog.
    pub async fn fetch(&self, base_url: &str, api_key: &str) -> Result<Vec<ModelDescriptor>, CatalogError> {
        tokio::time::timeout(self.timeout, self.fetch_unbounded(base_url, api_key))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))?
    }

    async fn fetch_unbounded(&self, base_url: &str, api_key: &str) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let url = format!("{}/models", base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = resp.text().await?;
        parse_catalog(&body)
    }
}

/// Parse a `{data: [{id, name?, context_length?}]}` body. Entries without a
/// string id are skipped.
pub fn parse_catalog(body: &str) -> Result<Vec<ModelDescriptor>, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let data = value
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or(CatalogError::MissingData)?;

    let models: Vec<ModelDescriptor> = data
        .iter()
        .filter_map(|entry| serde_json::from_value::<CatalogEntry>(entry.clone()).ok())
        .filter_map(|entry| {
            let id = entry.id.filter(|id| !id.is_empty())?;
            Some(describe_model(&id, entry.name.as_deref(), entry.context_length))
        })
        .collect();

    if models.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(models)
}
