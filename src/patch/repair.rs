//! Structural repair of a persisted document.
//!
//! The gateway rejects a provider entry whose `models` is not an array, and
//! earlier failed boots can leave exactly that behind. Repair runs before
//! anything else and is persisted on its own.

use serde_json::Value;
use tracing::warn;

use crate::config::ConfigDocument;

/// Force every `models.providers.*.models` to be an array.
///
/// Returns the repaired document and whether anything changed. Repairing a
/// repaired document is a no-op.
pub fn repair_provider_models(mut doc: ConfigDocument) -> (ConfigDocument, bool) {
    let needs_repair = match doc.get(&["models", "providers"]).and_then(Value::as_object) {
        Some(providers) => providers
            .values()
            .any(|p| !p.get("models").is_some_and(Value::is_array)),
        None => false,
    };
    if !needs_repair {
        return (doc, false);
    }

    let providers = doc.object_mut(&["models", "providers"]);
    for (name, provider) in providers.iter_mut() {
        let Some(entry) = provider.as_object_mut() else {
            warn!(provider = %name, "provider entry is not an object, resetting");
            *provider = serde_json::json!({ "models": [] });
            continue;
        };
        if !entry.get("models").is_some_and(Value::is_array) {
            warn!(provider = %name, "provider has no models array, repairing");
            entry.insert("models".to_string(), Value::Array(Vec::new()));
        }
    }
    (doc, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value)
    }

    #[test]
    fn adds_missing_and_replaces_non_array_models() {
        let input = doc(json!({
            "models": {"providers": {
                "anthropic": {"baseUrl": "https://x"},
                "openai": {"models": "oops"},
                "ok": {"models": [{"id": "m"}]}
            }}
        }));
        let (repaired, changed) = repair_provider_models(input);
        assert!(changed);
        assert_eq!(
            repaired.into_value(),
            json!({
                "models": {"providers": {
                    "anthropic": {"baseUrl": "https://x", "models": []},
                    "openai": {"models": []},
                    "ok": {"models": [{"id": "m"}]}
                }}
            })
        );
    }

    #[test]
    fn non_object_provider_is_reset() {
        let (repaired, changed) =
            repair_provider_models(doc(json!({"models": {"providers": {"bad": 3}}})));
        assert!(changed);
        assert_eq!(
            repaired.get(&["models", "providers", "bad"]),
            Some(&json!({"models": []}))
        );
    }

    #[test]
    fn repair_is_idempotent() {
        let input = doc(json!({"models": {"providers": {"a": {}, "b": {"models": null}}}}));
        let (once, _) = repair_provider_models(input);
        let (twice, changed) = repair_provider_models(once.clone());
        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn nothing_to_repair() {
        let input = doc(json!({"gateway": {"port": 1}}));
        let (out, changed) = repair_provider_models(input.clone());
        assert!(!changed);
        assert_eq!(out, input);
    }
}
