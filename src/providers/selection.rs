//! Default model selection.

use super::ModelDescriptor;
use crate::infra::fallback::Fallback;

/// Preferred model when the catalog offers it.
pub const FLAGSHIP_MODEL_ID: &str = "anthropic/claude-sonnet-4.5";

/// Any id containing this is the next best choice.
pub const PREFERRED_MODEL_SUBSTRING: &str = "claude-sonnet";

/// Used when the list is empty.
pub const FALLBACK_MODEL_ID: &str = "anthropic/claude-sonnet-4.5";

/// Pick the default model id: flagship, then preferred family, then the
/// first entry, then [`FALLBACK_MODEL_ID`].
pub fn select_default_model(models: &[ModelDescriptor]) -> String {
    let id = |m: &ModelDescriptor| m.id.clone();
    Fallback::new()
        .or_try(|| models.iter().find(|m| m.id == FLAGSHIP_MODEL_ID).map(id))
        .or_try(|| {
            models
                .iter()
                .find(|m| m.id.contains(PREFERRED_MODEL_SUBSTRING))
                .map(id)
        })
        .or_try(|| models.first().map(id))
        .resolve_or(FALLBACK_MODEL_ID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::describe_model;

    fn list(ids: &[&str]) -> Vec<ModelDescriptor> {
        ids.iter().map(|id| describe_model(id, None, None)).collect()
    }

    #[test]
    fn flagship_wins() {
        let models = list(&[
            "openai/gpt-5",
            "anthropic/claude-sonnet-4",
            FLAGSHIP_MODEL_ID,
            "google/gemini-2.5-pro",
        ]);
        assert_eq!(select_default_model(&models), FLAGSHIP_MODEL_ID);
    }

    #[test]
    fn preferred_substring_next() {
        let models = list(&["openai/gpt-5", "anthropic/claude-sonnet-4", "google/gemini-2.5-pro"]);
        assert_eq!(select_default_model(&models), "anthropic/claude-sonnet-4");
    }

    #[test]
    fn first_entry_otherwise() {
        let models = list(&["openai/gpt-5", "google/gemini-2.5-pro"]);
        assert_eq!(select_default_model(&models), "openai/gpt-5");
    }

    #[test]
    fn hardcoded_when_empty() {
        assert_eq!(select_default_model(&[]), FALLBACK_MODEL_ID);
    }
}
