//! Gateway launch plan.
//!
//! The boot sequence ends by starting the gateway with a fixed port and
//! bind. Auth is token based when a gateway token is configured and falls
//! back to device pairing otherwise.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitStatus;
use tracing::{info, warn};

use crate::config::{GATEWAY_BIND, GATEWAY_PORT};
use crate::env::{self, Env};

/// How clients authenticate to the launched gateway.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    Token(String),
    Pairing,
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Token(_) => write!(f, "Token(<redacted>)"),
            AuthMode::Pairing => write!(f, "Pairing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub port: u16,
    pub bind: String,
    pub auth: AuthMode,
}

impl LaunchPlan {
    pub fn new(program: impl Into<String>, env: &Env) -> Self {
        let auth = match env.get(env::GATEWAY_TOKEN) {
            Some(token) => AuthMode::Token(token.to_string()),
            None => AuthMode::Pairing,
        };
        Self {
            program: program.into(),
            port: GATEWAY_PORT,
            bind: GATEWAY_BIND.to_string(),
            auth,
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "gateway".to_string(),
            "--port".to_string(),
            self.port.to_string(),
            "--verbose".to_string(),
            "--allow-unconfigured".to_string(),
            "--bind".to_string(),
            self.bind.clone(),
        ];
        if let AuthMode::Token(token) = &self.auth {
            args.push("--token".to_string());
            args.push(token.clone());
        }
        args
    }

    /// The command line with the token masked, for logs and `--no-launch`.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.clone()];
        let mut mask_next = false;
        for arg in self.args() {
            if mask_next {
                parts.push("<redacted>".to_string());
                mask_next = false;
                continue;
            }
            mask_next = arg == "--token";
            parts.push(arg);
        }
        parts.join(" ")
    }

    /// Start the gateway and wait for it to exit.
    pub async fn run(&self) -> Result<ExitStatus> {
        info!(
            port = self.port,
            bind = %self.bind,
            auth = ?self.auth,
            "starting gateway"
        );
        tokio::process::Command::new(&self.program)
            .args(self.args())
            .status()
            .await
            .with_context(|| format!("Failed to start gateway '{}'", self.program))
    }
}

/// Remove lock files a crashed gateway left behind. Missing files are fine.
/// Returns how many were removed.
pub fn clean_stale_locks(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "removed stale gateway lock");
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "cannot remove gateway lock"),
        }
    }
    removed
}
