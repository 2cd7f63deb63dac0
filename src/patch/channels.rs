//! Messaging channel rules.
//!
//! Each channel is gated on its own credential variables. When enabled it
//! gets its credentials, `enabled: true` and a DM policy. Fields not named
//! here are left as the document has them.

use serde_json::{json, Map, Value};
use tracing::info;

use super::PatchContext;
use crate::config::{ConfigDocument, ALLOW_ALL, DEFAULT_DM_POLICY, OPEN_DM_POLICY};
use crate::env;

/// Where a channel keeps its DM settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DmShape {
    /// `dmPolicy` and `allowFrom` on the channel itself.
    Flat,
    /// `dm.policy` and `dm.allowFrom`.
    Nested,
}

struct ChannelRule {
    name: &'static str,
    /// `(env var, field)` pairs; every var must be set.
    credentials: &'static [(&'static str, &'static str)],
    policy_var: &'static str,
    allow_from_var: &'static str,
    dm_shape: DmShape,
}

const TELEGRAM: ChannelRule = ChannelRule {
    name: "telegram",
    credentials: &[(env::TELEGRAM_BOT_TOKEN, "botToken")],
    policy_var: env::TELEGRAM_DM_POLICY,
    allow_from_var: env::TELEGRAM_DM_ALLOW_FROM,
    dm_shape: DmShape::Flat,
};

const DISCORD: ChannelRule = ChannelRule {
    name: "discord",
    credentials: &[(env::DISCORD_BOT_TOKEN, "token")],
    policy_var: env::DISCORD_DM_POLICY,
    allow_from_var: env::DISCORD_DM_ALLOW_FROM,
    dm_shape: DmShape::Nested,
};

const SLACK: ChannelRule = ChannelRule {
    name: "slack",
    credentials: &[
        (env::SLACK_BOT_TOKEN, "botToken"),
        (env::SLACK_APP_TOKEN, "appToken"),
    ],
    policy_var: env::SLACK_DM_POLICY,
    allow_from_var: env::SLACK_DM_ALLOW_FROM,
    dm_shape: DmShape::Nested,
};

impl ChannelRule {
    fn apply(&self, mut doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
        let Some(credentials) = self
            .credentials
            .iter()
            .map(|(var, field)| ctx.env.get(var).map(|value| (*field, value)))
            .collect::<Option<Vec<_>>>()
        else {
            return doc;
        };

        let policy = ctx.env.get(self.policy_var).unwrap_or(DEFAULT_DM_POLICY);
        let allow_from = match ctx.env.list(self.allow_from_var) {
            Some(list) => Some(list),
            None if policy == OPEN_DM_POLICY => Some(vec![ALLOW_ALL.to_string()]),
            None => None,
        };

        let channel = doc.object_mut(&["channels", self.name]);
        for (field, value) in credentials {
            channel.insert(field.into(), json!(value));
        }
        channel.insert("enabled".into(), Value::Bool(true));

        match self.dm_shape {
            DmShape::Flat => write_policy(channel, "dmPolicy", policy, allow_from),
            DmShape::Nested => {
                let dm = channel
                    .entry("dm")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !dm.is_object() {
                    *dm = Value::Object(Map::new());
                }
                if let Some(dm) = dm.as_object_mut() {
                    write_policy(dm, "policy", policy, allow_from);
                }
            }
        }

        info!(channel = self.name, dm_policy = policy, "configured channel");
        doc
    }
}

fn write_policy(
    target: &mut Map<String, Value>,
    policy_field: &str,
    policy: &str,
    allow_from: Option<Vec<String>>,
) {
    target.insert(policy_field.into(), json!(policy));
    if let Some(allow_from) = allow_from {
        target.insert("allowFrom".into(), json!(allow_from));
    }
}

pub fn apply_telegram(doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    TELEGRAM.apply(doc, ctx)
}

pub fn apply_discord(doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    DISCORD.apply(doc, ctx)
}

pub fn apply_slack(doc: ConfigDocument, ctx: &PatchContext<'_>) -> ConfigDocument {
    SLACK.apply(doc, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use pretty_assertions::assert_eq;

    fn run(
        rule: fn(ConfigDocument, &PatchContext<'_>) -> ConfigDocument,
        doc: Value,
        env: &[(&str, &str)],
    ) -> Value {
        let env = Env::from_pairs(env.iter().copied());
        rule(ConfigDocument::from_value(doc), &PatchContext::new(&env, None)).into_value()
    }

    #[test]
    fn telegram_defaults_to_pairing() {
        let out = run(apply_telegram, json!({}), &[("TELEGRAM_BOT_TOKEN", "123:abc")]);
        assert_eq!(
            out["channels"]["telegram"],
            json!({"botToken": "123:abc", "enabled": true, "dmPolicy": "pairing"})
        );
    }

    #[test]
    fn telegram_open_policy_allows_everyone() {
        let out = run(
            apply_telegram,
            json!({}),
            &[("TELEGRAM_BOT_TOKEN", "t"), ("TELEGRAM_DM_POLICY", "open")],
        );
        assert_eq!(out["channels"]["telegram"]["allowFrom"], json!(["*"]));
    }

    #[test]
    fn explicit_allow_list_wins_over_sentinel() {
        let out = run(
            apply_telegram,
            json!({}),
            &[
                ("TELEGRAM_BOT_TOKEN", "t"),
                ("TELEGRAM_DM_POLICY", "open"),
                ("TELEGRAM_DM_ALLOW_FROM", "111, 222"),
            ],
        );
        assert_eq!(out["channels"]["telegram"]["allowFrom"], json!(["111", "222"]));
    }

    #[test]
    fn open_policy_with_empty_allow_list_allows_everyone() {
        let out = run(
            apply_telegram,
            json!({}),
            &[
                ("TELEGRAM_BOT_TOKEN", "t"),
                ("TELEGRAM_DM_POLICY", "open"),
                ("TELEGRAM_DM_ALLOW_FROM", " , "),
            ],
        );
        assert_eq!(out["channels"]["telegram"]["allowFrom"], json!(["*"]));
    }

    #[test]
    fn discord_uses_nested_dm_block() {
        let out = run(
            apply_discord,
            json!({"channels": {"discord": {"guilds": {"g": {}}}}}),
            &[("DISCORD_BOT_TOKEN", "d"), ("DISCORD_DM_POLICY", "open")],
        );
        assert_eq!(
            out["channels"]["discord"],
            json!({
                "token": "d",
                "enabled": true,
                "guilds": {"g": {}},
                "dm": {"policy": "open", "allowFrom": ["*"]}
            })
        );
    }

    #[test]
    fn slack_needs_both_tokens() {
        let doc = json!({"channels": {}});
        let out = run(apply_slack, doc.clone(), &[("SLACK_BOT_TOKEN", "xoxb")]);
        assert_eq!(out, doc);

        let out = run(
            apply_slack,
            doc,
            &[("SLACK_BOT_TOKEN", "xoxb"), ("SLACK_APP_TOKEN", "xapp")],
        );
        assert_eq!(
            out["channels"]["slack"],
            json!({
                "botToken": "xoxb",
                "appToken": "xapp",
                "enabled": true,
                "dm": {"policy": "pairing"}
            })
        );
    }

    #[test]
    fn unconfigured_channels_are_untouched() {
        let doc = json!({"channels": {"telegram": {"enabled": false}}});
        let out = run(apply_telegram, doc.clone(), &[]);
        assert_eq!(out, doc);
    }
}
