//! Tool rules.

use serde_json::json;

use super::PatchContext;
use crate::config::{
    ConfigDocument, SEARCH_CACHE_TTL_MINUTES, SEARCH_MAX_RESULTS, SEARCH_PROVIDER,
    SEARCH_TIMEOUT_SECONDS,
};
use crate::env;

/// Hosted web search, gated on its API key.
pub fn apply_web_search(mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    let Some(api_key) = ctx.env.get(env::BRAVE_API_KEY) else {
        return doc;
    };

    let search = doc.object_mut(&["tools", "web", "search"]);
    search.insert("enabled".into(), json!(true));
    search.insert("provider".into(), json!(SEARCH_PROVIDER));
    search.insert("apiKey".into(), json!(api_key));
    search.insert("maxResults".into(), json!(SEARCH_MAX_RESULTS));
    search.insert("timeoutSeconds".into(), json!(SEARCH_TIMEOUT_SECONDS));
    search.insert("cacheTtlMinutes".into(), json!(SEARCH_CACHE_TTL_MINUTES));
    doc
}
