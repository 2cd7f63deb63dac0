use std::path::PathBuf;

use crate::onboarding::ACCEPTED_CREDENTIALS;

/// Failures that must stop the boot before the gateway starts.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("no usable AI credentials are configured; set one of:\n{}", ACCEPTED_CREDENTIALS)]
    NoCredentials,

    #[error("onboarding could not be started: {0}")]
    OnboardingSpawn(#[source] std::io::Error),

    #[error("onboarding exited with {status}")]
    OnboardingFailed { status: String },

    #[error("onboarding finished but no config was written to {}", path.display())]
    OnboardingProducedNoConfig { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BootError>;
