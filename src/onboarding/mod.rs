//! First-boot credential selection and the external onboarding step.
//!
//! Only used when no configuration document exists yet. Exactly one
//! credential set is chosen, by fixed priority, and rendered into the
//! arguments the gateway's `onboard` command understands.

use async_trait::async_trait;
use tracing::info;

use crate::config::{GATEWAY_BIND, GATEWAY_PORT};
use crate::env::{self, Env};
use crate::error::{BootError, Result};
use crate::infra::fallback::Fallback;

/// Human-readable list of accepted combinations, in priority order.
pub const ACCEPTED_CREDENTIALS: &str = "  - AI_GATEWAY_BASE_URL + AI_GATEWAY_API_KEY
  - CLOUDFLARE_AI_GATEWAY_API_KEY + CF_AI_GATEWAY_ACCOUNT_ID + CF_AI_GATEWAY_GATEWAY_ID
  - ANTHROPIC_API_KEY (optionally ANTHROPIC_BASE_URL)
  - OPENAI_API_KEY (optionally OPENAI_BASE_URL)";

// ============================================================================
// Credential Sets
// ============================================================================

/// One complete way to authenticate against a model provider.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSet {
    GatewayProxy {
        base_url: String,
        api_key: String,
    },
    CloudflareGateway {
        account_id: String,
        gateway_id: String,
        api_key: String,
    },
    AnthropicDirect {
        api_key: String,
        base_url: Option<String>,
    },
    OpenAiDirect {
        api_key: String,
        base_url: Option<String>,
    },
}

impl CredentialSet {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSet::GatewayProxy { .. } => "gateway-proxy",
            CredentialSet::CloudflareGateway { .. } => "cloudflare-ai-gateway",
            CredentialSet::AnthropicDirect { .. } => "anthropic",
            CredentialSet::OpenAiDirect { .. } => "openai",
        }
    }

    /// `--auth-choice ...` arguments for the onboarding command.
    ///
    /// The proxy variant onboards as an OpenAI-compatible key; its base URL
    /// is wired in afterwards by the provider patch rule.
    pub fn onboard_args(&self) -> Vec<String> {
        let args: Vec<&str> = match self {
            CredentialSet::GatewayProxy { api_key, .. }
            | CredentialSet::OpenAiDirect { api_key, .. } => {
                vec!["--auth-choice", "openai-api-key", "--openai-api-key", api_key.as_str()]
            }
            CredentialSet::CloudflareGateway {
                account_id,
                gateway_id,
                api_key,
            } => vec![
                "--auth-choice",
                "cloudflare-ai-gateway-api-key",
                "--cloudflare-ai-gateway-account-id",
                account_id.as_str(),
                "--cloudflare-ai-gateway-gateway-id",
                gateway_id.as_str(),
                "--cloudflare-ai-gateway-api-key",
                api_key.as_str(),
            ],
            CredentialSet::AnthropicDirect { api_key, .. } => {
                vec!["--auth-choice", "apiKey", "--anthropic-api-key", api_key.as_str()]
            }
        };
        args.into_iter().map(String::from).collect()
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base_url = match self {
            CredentialSet::GatewayProxy { base_url, .. } => Some(base_url.as_str()),
            CredentialSet::AnthropicDirect { base_url, .. }
            | CredentialSet::OpenAiDirect { base_url, .. } => base_url.as_deref(),
            CredentialSet::CloudflareGateway { .. } => None,
        };
        f.debug_struct("CredentialSet")
            .field("kind", &self.kind())
            .field("base_url", &base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Select the highest-priority credential set whose variables are all set.
pub fn build_auth_choice(env: &Env) -> Option<CredentialSet> {
    Fallback::new()
        .or_try(|| {
            Some(CredentialSet::GatewayProxy {
                base_url: env.get(env::AI_GATEWAY_BASE_URL)?.to_string(),
                api_key: env.get(env::AI_GATEWAY_API_KEY)?.to_string(),
            })
        })
        .or_try(|| {
            Some(CredentialSet::CloudflareGateway {
                account_id: env.get(env::CF_AI_GATEWAY_ACCOUNT_ID)?.to_string(),
                gateway_id: env.get(env::CF_AI_GATEWAY_GATEWAY_ID)?.to_string(),
                api_key: env.get(env::CF_AI_GATEWAY_API_KEY)?.to_string(),
            })
        })
        .or_try(|| {
            Some(CredentialSet::AnthropicDirect {
                api_key: env.get(env::ANTHROPIC_API_KEY)?.to_string(),
                base_url: env.get(env::ANTHROPIC_BASE_URL).map(String::from),
            })
        })
        .or_try(|| {
            Some(CredentialSet::OpenAiDirect {
                api_key: env.get(env::OPENAI_API_KEY)?.to_string(),
                base_url: env.get(env::OPENAI_BASE_URL).map(String::from),
            })
        })
        .resolve()
}

/// Like [`build_auth_choice`], but a missing selection is fatal.
pub fn require_auth_choice(env: &Env) -> Result<CredentialSet> {
    build_auth_choice(env).ok_or(BootError::NoCredentials)
}

// ============================================================================
// Onboarding
// ============================================================================

/// The external step that creates a fresh configuration document.
#[async_trait]
pub trait Onboarder: Send + Sync {
    async fn onboard(&self, choice: &CredentialSet) -> Result<()>;
}

/// Runs `<program> onboard --non-interactive ...`.
#[derive(Debug, Clone)]
pub struct CommandOnboarder {
    program: String,
}

impl CommandOnboarder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(choice: &CredentialSet) -> Vec<String> {
        let mut args: Vec<String> = [
            "onboard",
            "--non-interactive",
            "--accept-risk",
            "--mode",
            "local",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        args.extend(choice.onboard_args());
        args.extend([
            "--gateway-port".to_string(),
            GATEWAY_PORT.to_string(),
            "--gateway-bind".to_string(),
            GATEWAY_BIND.to_string(),
            "--skip-channels".to_string(),
            "--skip-skills".to_string(),
            "--skip-health".to_string(),
        ]);
        args
    }
}

#[async_trait]
impl Onboarder for CommandOnboarder {
    async fn onboard(&self, choice: &CredentialSet) -> Result<()> {
        info!(program = %self.program, auth = choice.kind(), "running onboarding");
        let status = tokio::process::Command::new(&self.program)
            .args(Self::args(choice))
            .status()
            .await
            .map_err(BootError::OnboardingSpawn)?;

        if !status.success() {
            return Err(BootError::OnboardingFailed {
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Env {
        Env::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn gateway_proxy_beats_anthropic() {
        let e = env(&[
            ("AI_GATEWAY_BASE_URL", "https://gw.example/v1"),
            ("AI_GATEWAY_API_KEY", "gw-key"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]);
        assert_eq!(
            build_auth_choice(&e),
            Some(CredentialSet::GatewayProxy {
                base_url: "https://gw.example/v1".into(),
                api_key: "gw-key".into(),
            })
        );
    }

    #[test]
    fn incomplete_sets_are_skipped() {
        let e = env(&[
            ("AI_GATEWAY_API_KEY", "gw-key"),
            ("CF_AI_GATEWAY_ACCOUNT_ID", "acct"),
            ("CLOUDFLARE_AI_GATEWAY_API_KEY", "cf-key"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]);
        assert_eq!(
            build_auth_choice(&e),
            Some(CredentialSet::OpenAiDirect {
                api_key: "sk-openai".into(),
                base_url: None,
            })
        );
    }

    #[test]
    fn full_priority_order() {
        let all = [
            ("AI_GATEWAY_BASE_URL", "u"),
            ("AI_GATEWAY_API_KEY", "k"),
            ("CLOUDFLARE_AI_GATEWAY_API_KEY", "cf"),
            ("CF_AI_GATEWAY_ACCOUNT_ID", "a"),
            ("CF_AI_GATEWAY_GATEWAY_ID", "g"),
            ("ANTHROPIC_API_KEY", "ant"),
            ("OPENAI_API_KEY", "oai"),
        ];
        let expected = ["gateway-proxy", "cloudflare-ai-gateway", "anthropic", "openai"];
        // Drop the winning group each round and check the next one takes over.
        let mut remaining: Vec<(&str, &str)> = all.to_vec();
        for kind in expected {
            let choice = build_auth_choice(&env(&remaining)).unwrap();
            assert_eq!(choice.kind(), kind);
            remaining.retain(|(k, _)| match kind {
                "gateway-proxy" => !k.starts_with("AI_GATEWAY"),
                "cloudflare-ai-gateway" => !k.contains("CLOUDFLARE") && !k.starts_with("CF_"),
                "anthropic" => !k.starts_with("ANTHROPIC"),
                _ => true,
            });
        }
    }

    #[test]
    fn nothing_set_is_fatal() {
        assert_eq!(build_auth_choice(&Env::default()), None);
        let err = require_auth_choice(&Env::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ANTHROPIC_API_KEY"));
        assert!(msg.contains("AI_GATEWAY_BASE_URL + AI_GATEWAY_API_KEY"));
    }

    #[test]
    fn renders_onboard_command() {
        let choice = CredentialSet::AnthropicDirect {
            api_key: "sk-ant".into(),
            base_url: None,
        };
        let args = CommandOnboarder::args(&choice);
        assert_eq!(&args[..5], ["onboard", "--non-interactive", "--accept-risk", "--mode", "local"]);
        assert!(args.windows(2).any(|w| w == ["--anthropic-api-key", "sk-ant"]));
        assert!(args.windows(2).any(|w| w == ["--gateway-port", "18789"]));
        assert!(args.ends_with(&["--skip-health".to_string()]));
    }

    #[test]
    fn cloudflare_args_carry_ids() {
        let choice = CredentialSet::CloudflareGateway {
            account_id: "acct".into(),
            gateway_id: "gw".into(),
            api_key: "cf".into(),
        };
        let args = choice.onboard_args();
        assert_eq!(args[1], "cloudflare-ai-gateway-api-key");
        assert!(args.windows(2).any(|w| w == ["--cloudflare-ai-gateway-gateway-id", "gw"]));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let choice = CredentialSet::GatewayProxy {
            base_url: "https://gw".into(),
            api_key: "super-secret".into(),
        };
        let rendered = format!("{choice:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("https://gw"));
    }
}
