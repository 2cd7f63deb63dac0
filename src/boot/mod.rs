//! The boot sequence.
//!
//! Restore from backup, onboard when no configuration exists, repair and
//! patch the configuration, then hand back the gateway launch plan. Only
//! missing credentials and a failed onboarding stop the sequence; every
//! other problem is logged and the boot carries on.

use tracing::{error, info, warn};

use crate::config::BootConfig;
use crate::env::Env;
use crate::error::{BootError, Result};
use crate::gateway::{clean_stale_locks, LaunchPlan};
use crate::onboarding::{require_auth_choice, Onboarder};
use crate::patch::{ConfigPatcher, PatchReport};
use crate::providers::ModelCatalogResolver;
use crate::restore::{AssetClass, RestoreEngine, RestoreReport};

/// What a completed boot did, plus how to start the gateway.
#[derive(Debug, Clone)]
pub struct BootOutcome {
    pub restores: Vec<RestoreReport>,
    pub onboarded: bool,
    pub patch: PatchReport,
    pub launch: LaunchPlan,
}

pub struct BootSequence<'a> {
    config: BootConfig,
    env: Env,
    onboarder: &'a dyn Onboarder,
    patcher: ConfigPatcher,
}

impl<'a> BootSequence<'a> {
    pub fn new(config: BootConfig, env: Env, onboarder: &'a dyn Onboarder) -> Self {
        let patcher = ConfigPatcher::new(ModelCatalogResolver::new(config.catalog_timeout()));
        Self {
            config,
            env,
            onboarder,
            patcher,
        }
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    /// Restore configuration and skills from the backup store.
    ///
    /// A failed copy leaves the local data as it was.
    pub fn restore(&self) -> Vec<RestoreReport> {
        let engine = RestoreEngine::from_config(&self.config);
        let targets = [
            (AssetClass::Config, &self.config.config_dir),
            (AssetClass::Skills, &self.config.skills_dir),
        ];

        let mut reports = Vec::new();
        for (asset, local_root) in targets {
            match engine.restore(asset, local_root, &self.config.backup_dir) {
                Ok(report) => reports.push(report),
                Err(e) => warn!(%asset, error = %e, "restore failed; keeping local data"),
            }
        }
        reports
    }

    /// Run onboarding if the configuration document does not exist yet.
    /// Returns whether onboarding ran.
    pub async fn ensure_config(&self) -> Result<bool> {
        let path = self.config.config_file();
        if path.exists() {
            info!(path = %path.display(), "using existing config");
            return Ok(false);
        }

        info!(path = %path.display(), "no config found; onboarding");
        let choice = require_auth_choice(&self.env)?;
        self.onboarder.onboard(&choice).await?;

        if !path.exists() {
            return Err(BootError::OnboardingProducedNoConfig { path });
        }
        Ok(true)
    }

    pub async fn patch(&self) -> Result<PatchReport> {
        let report = self
            .patcher
            .patch_file(&self.config.config_file(), &self.env)
            .await?;
        Ok(report)
    }

    /// Everything up to, but not including, starting the gateway.
    pub async fn run(&self) -> Result<BootOutcome> {
        let restores = self.restore();

        let onboarded = match self.ensure_config().await {
            Ok(onboarded) => onboarded,
            Err(e) => {
                error!(error = %e, "boot halted before gateway start");
                return Err(e);
            }
        };

        let patch = self.patch().await?;
        info!(
            before = %patch.digest_before,
            after = %patch.digest_after,
            changed = patch.changed(),
            "config digest"
        );

        clean_stale_locks(&self.config.lock_files);
        let launch = LaunchPlan::new(&self.config.gateway_bin, &self.env);

        Ok(BootOutcome {
            restores,
            onboarded,
            patch,
            launch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::CredentialSet;
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingOnboarder {
        calls: AtomicUsize,
        writes: Option<PathBuf>,
    }

    #[async_trait]
    impl Onboarder for CountingOnboarder {
        async fn onboard(&self, _choice: &CredentialSet) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(path) = &self.writes {
                fs::create_dir_all(path.parent().unwrap())?;
                fs::write(path, "{}")?;
            }
            Ok(())
        }
    }

    fn config_in(dir: &TempDir) -> BootConfig {
        BootConfig {
            config_dir: dir.path().join("config"),
            backup_dir: dir.path().join("backup"),
            skills_dir: dir.path().join("skills"),
            lock_files: vec![dir.path().join("gateway.lock")],
            catalog_timeout_secs: 1,
            ..BootConfig::default()
        }
    }

    #[tokio::test]
    async fn existing_config_skips_onboarding() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::create_dir_all(&config.config_dir).unwrap();
        fs::write(config.config_file(), "{}").unwrap();
        let onboarder = CountingOnboarder {
            calls: AtomicUsize::new(0),
            writes: None,
        };

        let boot = BootSequence::new(config, Env::default(), &onboarder);
        let outcome = boot.run().await.unwrap();
        assert!(!outcome.onboarded);
        assert_eq!(onboarder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.launch.auth, crate::gateway::AuthMode::Pairing);
    }

    #[tokio::test]
    async fn onboarding_without_output_is_fatal() {
        let dir = TempDir::new().unwrap();
        let onboarder = CountingOnboarder {
            calls: AtomicUsize::new(0),
            writes: None,
        };
        let env = Env::from_pairs([("ANTHROPIC_API_KEY", "k")]);

        let boot = BootSequence::new(config_in(&dir), env, &onboarder);
        let err = boot.run().await.unwrap_err();
        assert!(matches!(err, BootError::OnboardingProducedNoConfig { .. }));
        assert_eq!(onboarder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_locks_are_cleared_before_launch() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let lock = config.lock_files[0].clone();
        fs::write(&lock, "").unwrap();
        let onboarder = CountingOnboarder {
            calls: AtomicUsize::new(0),
            writes: Some(config.config_file()),
        };
        let env = Env::from_pairs([("OPENAI_API_KEY", "k")]);

        let outcome = BootSequence::new(config, env, &onboarder).run().await.unwrap();
        assert!(outcome.onboarded);
        assert!(!lock.exists());
    }
}
