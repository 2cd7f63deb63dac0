mod catalog;
mod selection;

pub use catalog::*;
pub use selection::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Model Descriptors
// ============================================================================

/// Input modality a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

/// A model entry as written under `models.providers.<name>.models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub context_window: u64,
    pub reasoning: bool,
    pub input: BTreeSet<Modality>,
}

// ============================================================================
// Classification
// ============================================================================

/// Context window used when no keyword matches.
pub const DEFAULT_CONTEXT_WINDOW: u64 = 128_000;

/// Keyword tiers, first match wins.
const CONTEXT_WINDOW_TIERS: &[(&str, u64)] = &[
    ("image", 32_768),
    ("thinking", 200_000),
    ("claude", 200_000),
    ("gemini", 1_000_000),
    ("gpt", 128_000),
];

const REASONING_MARKERS: &[&str] = &["thinking", "reasoning", "reasoner"];

const IMAGE_MARKERS: &[&str] = &["image", "vision", "-vl"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Context window for `id` from the keyword tiers.
pub fn classify_context_window(id: &str) -> u64 {
    let lower = id.to_lowercase();
    CONTEXT_WINDOW_TIERS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, size)| *size)
        .unwrap_or(DEFAULT_CONTEXT_WINDOW)
}

/// `anthropic/claude-sonnet-4.5` -> `Claude Sonnet 4.5`
pub fn humanize_model_id(id: &str) -> String {
    let base = id.rsplit('/').next().unwrap_or(id);
    base.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a descriptor for `id`. A non-empty `name` and a positive
/// `context_length` reported by the catalog take precedence over the
/// derived values.
pub fn describe_model(id: &str, name: Option<&str>, context_length: Option<u64>) -> ModelDescriptor {
    let lower = id.to_lowercase();

    let mut input = BTreeSet::from([Modality::Text]);
    if contains_any(&lower, IMAGE_MARKERS) {
        input.insert(Modality::Image);
    }

    ModelDescriptor {
        id: id.to_string(),
        name: name
            .filter(|n| !n.trim().is_empty())
            .map(String::from)
            .unwrap_or_else(|| humanize_model_id(id)),
        context_window: context_length
            .filter(|len| *len > 0)
            .unwrap_or_else(|| classify_context_window(id)),
        reasoning: contains_any(&lower, REASONING_MARKERS),
        input,
    }
}

/// Static list used whenever discovery fails.
pub fn fallback_models() -> Vec<ModelDescriptor> {
    [
        ("anthropic/claude-sonnet-4.5", "Claude Sonnet 4.5"),
        ("anthropic/claude-haiku-4.5", "Claude Haiku 4.5"),
    ]
    .into_iter()
    .map(|(id, name)| ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        context_window: 200_000,
        reasoning: false,
        input: BTreeSet::from([Modality::Text, Modality::Image]),
    })
    .collect()
}
