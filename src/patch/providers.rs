//! Model provider rules: the legacy direct provider and the proxy provider.

use serde_json::{json, Map, Value};
use tracing::info;

use super::PatchContext;
use crate::config::{
    ConfigDocument, DIRECT_PROVIDER, DIRECT_PROVIDER_API, PROXY_PROVIDER, PROXY_PROVIDER_API,
};
use crate::env::{self, Env};
use crate::infra::fallback::first_present;
use crate::providers::ResolvedCatalog;

/// Base URL and key the proxy provider is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub base_url: String,
    pub api_key: String,
}

/// Gateway variables first, direct-provider variables second. Both the URL
/// and the key must resolve.
pub fn resolve_proxy_credentials(env: &Env) -> Option<ProxyCredentials> {
    let base_url = first_present([
        env.get(env::AI_GATEWAY_BASE_URL),
        env.get(env::ANTHROPIC_BASE_URL),
    ])?;
    let api_key = first_present([
        env.get(env::AI_GATEWAY_API_KEY),
        env.get(env::ANTHROPIC_API_KEY),
    ])?;
    Some(ProxyCredentials {
        base_url: base_url.to_string(),
        api_key: api_key.to_string(),
    })
}

fn has_populated_models(provider: &Value) -> bool {
    provider
        .get("models")
        .and_then(Value::as_array)
        .is_some_and(|models| !models.is_empty())
}

fn ensure_models_array(provider: &mut Map<String, Value>) {
    if !provider.get("models").is_some_and(Value::is_array) {
        provider.insert("models".into(), Value::Array(Vec::new()));
    }
}

/// Direct provider base-URL override, only when both key and URL are set.
pub fn apply_direct_provider(mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    let (Some(api_key), Some(base_url)) = (
        ctx.env.get(env::ANTHROPIC_API_KEY),
        ctx.env.get(env::ANTHROPIC_BASE_URL),
    ) else {
        return doc;
    };

    let provider = doc.object_mut(&["models", "providers", DIRECT_PROVIDER]);
    provider.insert("baseUrl".into(), json!(base_url));
    provider.insert("apiKey".into(), json!(api_key));
    provider
        .entry("api")
        .or_insert_with(|| json!(DIRECT_PROVIDER_API));
    ensure_models_array(provider);
    doc
}

/// Proxy provider reconciliation.
///
/// Drops a direct-provider entry without populated models, writes the proxy
/// provider with the discovered catalog and points the default model at it.
pub fn apply_proxy_provider(mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    let Some(proxy) = resolve_proxy_credentials(ctx.env) else {
        return doc;
    };
    let catalog = ctx
        .catalog
        .cloned()
        .unwrap_or_else(ResolvedCatalog::fallback);

    let stale_direct = doc
        .get(&["models", "providers", DIRECT_PROVIDER])
        .is_some_and(|p| !has_populated_models(p));
    if stale_direct {
        info!(provider = DIRECT_PROVIDER, "removing provider entry without models");
        doc.remove(&["models", "providers", DIRECT_PROVIDER]);
    }

    let provider = doc.object_mut(&["models", "providers", PROXY_PROVIDER]);
    provider.insert("baseUrl".into(), json!(proxy.base_url));
    provider.insert("apiKey".into(), json!(proxy.api_key));
    provider.insert("api".into(), json!(PROXY_PROVIDER_API));
    provider.insert("models".into(), json!(catalog.models));

    let primary = format!("{PROXY_PROVIDER}/{}", catalog.default_model);
    let defaults = doc.object_mut(&["agents", "defaults"]);
    match defaults.get_mut("model").and_then(Value::as_object_mut) {
        Some(model) => {
            model.insert("primary".into(), json!(primary));
        }
        None => {
            defaults.insert("model".into(), json!({ "primary": primary }));
        }
    }

    info!(
        provider = PROXY_PROVIDER,
        models = catalog.models.len(),
        default = %catalog.default_model,
        "configured proxy provider"
    );
    doc
}
