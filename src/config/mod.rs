mod defaults;
mod document;
mod io;

pub use defaults::*;
pub use document::*;
pub use io::*;

use crate::env::Env;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Settings of the boot tool itself: where state lives and how to reach the
/// gateway executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BootConfig {
    /// Local directory holding `<namespace>.json`.
    pub config_dir: PathBuf,
    pub namespace: String,
    pub legacy_namespace: String,
    /// Root of the mounted backup store.
    pub backup_dir: PathBuf,
    /// Local skills directory.
    pub skills_dir: PathBuf,
    pub marker_name: String,
    pub gateway_bin: String,
    pub catalog_timeout_secs: u64,
    /// Stale lock files removed before launch.
    pub lock_files: Vec<PathBuf>,
}

impl BootConfig {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path.map(Path::new), &Env::from_process())
    }

    pub fn load_with_env(path: Option<&Path>, env: &Env) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!("Loading boot settings from {}", path.display());
                let value = read_config_file_snapshot(path)?;
                serde_json::from_value(value).with_context(|| {
                    format!("Invalid boot settings in '{}'", path.display())
                })?
            }
            None => BootConfig::default(),
        };

        config.apply_env_overrides(env);
        Ok(config)
    }

    fn apply_env_overrides(&mut self, env: &Env) {
        if let Some(dir) = env.get("CLAWBOOT_CONFIG_DIR") {
            self.config_dir = PathBuf::from(dir);
        }

        if let Some(dir) = env.get("CLAWBOOT_BACKUP_DIR") {
            self.backup_dir = PathBuf::from(dir);
        }

        if let Some(dir) = env.get("CLAWBOOT_SKILLS_DIR") {
            self.skills_dir = PathBuf::from(dir);
        }

        if let Some(bin) = env.get("CLAWBOOT_GATEWAY_BIN") {
            self.gateway_bin = bin.to_string();
        }

        if let Some(secs) = env.get("CLAWBOOT_CATALOG_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.catalog_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid CLAWBOOT_CATALOG_TIMEOUT_SECS '{secs}'"),
            }
        }
    }

    /// `<configDir>/<namespace>.json`
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(format!("{}.json", self.namespace))
    }

    pub fn local_marker(&self) -> PathBuf {
        self.config_dir.join(&self.marker_name)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let config_dir = home.join(format!(".{NAMESPACE}"));
        let mut lock_files: Vec<PathBuf> = GATEWAY_LOCK_FILES.iter().map(PathBuf::from).collect();
        lock_files.push(config_dir.join("gateway.lock"));

        Self {
            config_dir,
            namespace: NAMESPACE.to_string(),
            legacy_namespace: LEGACY_NAMESPACE.to_string(),
            backup_dir: PathBuf::from(BACKUP_DIR),
            skills_dir: home.join("clawd").join("skills"),
            marker_name: MARKER_NAME.to_string(),
            gateway_bin: GATEWAY_BIN.to_string(),
            catalog_timeout_secs: CATALOG_TIMEOUT_SECS,
            lock_files,
        }
    }
}
