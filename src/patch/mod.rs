//! Idempotent patching of the gateway configuration document.
//!
//! Patching is an ordered list of pure rules, each taking the document by
//! value and returning the next state. Rules are independent; where two
//! touch the same subtree the later one wins. Structural repair always runs
//! first and, when it changes anything, is persisted before the rules run.

mod channels;
mod gateway;
mod providers;
mod repair;
mod tools;

pub use channels::{apply_discord, apply_slack, apply_telegram};
pub use gateway::{apply_control_ui, apply_gateway_network};
pub use providers::{apply_direct_provider, apply_proxy_provider, resolve_proxy_credentials, ProxyCredentials};
pub use repair::repair_provider_models;
pub use tools::apply_web_search;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

use crate::config::ConfigDocument;
use crate::env::Env;
use crate::providers::{CatalogSource, ModelCatalogResolver, ResolvedCatalog};

/// Inputs every rule may read.
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub env: &'a Env,
    /// Models for the proxy provider, resolved before the rules run.
    pub catalog: Option<&'a ResolvedCatalog>,
}

impl<'a> PatchContext<'a> {
    pub fn new(env: &'a Env, catalog: Option<&'a ResolvedCatalog>) -> Self {
        Self { env, catalog }
    }
}

/// A single patch rule.
pub type PatchRule = fn(ConfigDocument, &PatchContext<'_>) -> ConfigDocument;

/// Rules in application order.
pub const RULES: &[(&str, PatchRule)] = &[
    ("sections", ensure_sections),
    ("gateway-network", apply_gateway_network),
    ("control-ui", apply_control_ui),
    ("direct-provider", apply_direct_provider),
    ("proxy-provider", apply_proxy_provider),
    ("telegram", apply_telegram),
    ("discord", apply_discord),
    ("slack", apply_slack),
    ("web-search", apply_web_search),
];

/// Top-level sections the gateway expects to exist.
///
/// `agents.defaults.model` may also be a plain model reference string; only
/// a missing one is created.
pub fn ensure_sections(mut doc: ConfigDocument, _ctx: &PatchContext<'_>) -> ConfigDocument {
    doc.object_mut(&["agents", "defaults"])
        .entry("model")
        .or_insert_with(|| Value::Object(Map::new()));
    doc.object_mut(&["gateway"]);
    doc.object_mut(&["channels"]);
    doc.object_mut(&["models", "providers"]);
    doc
}

/// Run every rule after repair. Returns the names of rules that changed the
/// document.
pub fn apply_rules(doc: ConfigDocument, ctx: &PatchContext<'_>) -> (ConfigDocument, Vec<&'static str>) {
    let (mut doc, _) = repair_provider_models(doc);
    let mut fired = Vec::new();
    for (name, rule) in RULES {
        let before = doc.clone();
        doc = rule(doc, ctx);
        if doc != before {
            debug!(rule = name, "patch rule applied");
            fired.push(*name);
        }
    }
    (doc, fired)
}

/// Summary of one [`ConfigPatcher::patch_file`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub repaired: bool,
    pub rules_fired: Vec<&'static str>,
    pub digest_before: String,
    pub digest_after: String,
    pub catalog_source: Option<CatalogSource>,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.digest_before != self.digest_after
    }
}

/// Repairs and patches configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigPatcher {
    resolver: ModelCatalogResolver,
}

impl ConfigPatcher {
    pub fn new(resolver: ModelCatalogResolver) -> Self {
        Self { resolver }
    }

    /// Discover the proxy catalog if proxy credentials are present.
    pub async fn resolve_catalog(&self, env: &Env) -> Option<ResolvedCatalog> {
        let proxy = resolve_proxy_credentials(env)?;
        Some(self.resolver.resolve(&proxy.base_url, &proxy.api_key).await)
    }

    /// Repair and patch `doc` in memory.
    pub async fn patch(&self, doc: ConfigDocument, env: &Env) -> ConfigDocument {
        let catalog = self.resolve_catalog(env).await;
        let ctx = PatchContext::new(env, catalog.as_ref());
        apply_rules(doc, &ctx).0
    }

    /// Load the document at `path`, persist any structural repair, then
    /// persist the fully patched document.
    ///
    /// Each write replaces the file atomically with a complete document.
    pub async fn patch_file(&self, path: &Path, env: &Env) -> Result<PatchReport> {
        let loaded = ConfigDocument::load(path)?;
        let digest_before = loaded.digest();

        let (doc, repaired) = repair_provider_models(loaded);
        if repaired {
            doc.save(path)
                .with_context(|| format!("Failed to persist repaired config '{}'", path.display()))?;
            info!(path = %path.display(), "persisted structural repair");
        }

        let catalog = self.resolve_catalog(env).await;
        let ctx = PatchContext::new(env, catalog.as_ref());
        let (doc, rules_fired) = apply_rules(doc, &ctx);

        doc.save(path)
            .with_context(|| format!("Failed to write patched config '{}'", path.display()))?;

        let report = PatchReport {
            repaired,
            rules_fired,
            digest_after: doc.digest(),
            digest_before,
            catalog_source: catalog.map(|c| c.source),
        };
        info!(
            path = %path.display(),
            changed = report.changed(),
            rules = ?report.rules_fired,
            "config patched"
        );
        Ok(report)
    }
}
