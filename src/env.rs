//! Snapshot of the process environment.
//!
//! Every boot decision reads variables through [`Env`] rather than
//! `std::env::var` so the rules stay pure and can be exercised in tests
//! with an explicit variable set.

use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// Variable names
// ============================================================================

pub const GATEWAY_TOKEN: &str = "OPENCLAW_GATEWAY_TOKEN";
pub const DEV_MODE: &str = "DEV_MODE";

pub const AI_GATEWAY_BASE_URL: &str = "AI_GATEWAY_BASE_URL";
pub const AI_GATEWAY_API_KEY: &str = "AI_GATEWAY_API_KEY";

pub const CF_AI_GATEWAY_API_KEY: &str = "CLOUDFLARE_AI_GATEWAY_API_KEY";
pub const CF_AI_GATEWAY_ACCOUNT_ID: &str = "CF_AI_GATEWAY_ACCOUNT_ID";
pub const CF_AI_GATEWAY_GATEWAY_ID: &str = "CF_AI_GATEWAY_GATEWAY_ID";

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_DM_POLICY: &str = "TELEGRAM_DM_POLICY";
pub const TELEGRAM_DM_ALLOW_FROM: &str = "TELEGRAM_DM_ALLOW_FROM";

pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
pub const DISCORD_DM_POLICY: &str = "DISCORD_DM_POLICY";
pub const DISCORD_DM_ALLOW_FROM: &str = "DISCORD_DM_ALLOW_FROM";

pub const SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const SLACK_APP_TOKEN: &str = "SLACK_APP_TOKEN";
pub const SLACK_DM_POLICY: &str = "SLACK_DM_POLICY";
pub const SLACK_DM_ALLOW_FROM: &str = "SLACK_DM_ALLOW_FROM";

pub const BRAVE_API_KEY: &str = "BRAVE_API_KEY";

// ============================================================================
// Env
// ============================================================================

/// An immutable set of environment variables.
///
/// Empty values are indistinguishable from unset ones.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars_os().filter_map(|(k, v)| {
            match (k.into_string(), v.into_string()) {
                (Ok(k), Ok(v)) => Some((k, v)),
                (k, _) => {
                    debug!(name = ?k, "skipping non UTF-8 environment variable");
                    None
                }
            }
        }))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, or `None` when unset or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// True only for the literal string `"true"`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    /// Comma separated list, trimmed, empty items dropped. `None` when the
    /// variable is unset or holds no items.
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .get(name)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!items.is_empty()).then_some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_absent() {
        let env = Env::from_pairs([("A", ""), ("B", "x")]);
        assert_eq!(env.get("A"), None);
        assert_eq!(env.get("B"), Some("x"));
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn flag_requires_literal_true() {
        let env = Env::from_pairs([("ON", "true"), ("ONE", "1"), ("UPPER", "TRUE")]);
        assert!(env.flag("ON"));
        assert!(!env.flag("ONE"));
        assert!(!env.flag("UPPER"));
        assert!(!env.flag("MISSING"));
    }

    #[test]
    fn list_splits_and_trims() {
        let env = Env::from_pairs([("L", " 123, 456 ,,789 ")]);
        assert_eq!(
            env.list("L"),
            Some(vec!["123".to_string(), "456".to_string(), "789".to_string()])
        );
        assert_eq!(env.list("NONE"), None);
    }

    #[test]
    fn list_of_only_separators_is_absent() {
        let env = Env::from_pairs([("L", ", ,,")]);
        assert_eq!(env.list("L"), None);
    }

    #[cfg(unix)]
    #[test]
    fn process_snapshot_skips_non_utf8_values() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("CLAWBOOT_TEST_NON_UTF8", OsStr::from_bytes(b"f\xffo"));
        std::env::set_var("CLAWBOOT_TEST_UTF8", "fine");
        let env = Env::from_process();
        std::env::remove_var("CLAWBOOT_TEST_NON_UTF8");
        std::env::remove_var("CLAWBOOT_TEST_UTF8");

        assert_eq!(env.get("CLAWBOOT_TEST_NON_UTF8"), None);
        assert_eq!(env.get("CLAWBOOT_TEST_UTF8"), Some("fine"));
    }
}
