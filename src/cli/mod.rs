use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "clawboot",
    version,
    about = "Boot-time state reconciliation for a sandboxed agent gateway"
)]
pub struct Cli {
    /// Boot settings file (JSON, JSON5, YAML or TOML).
    #[arg(short, long, global = true, env = "CLAWBOOT_CONFIG")]
    pub config: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Restore, onboard, patch, then start the gateway.
    Boot(BootOpts),
    /// Restore config and skills from the backup store only.
    Restore(PathOpts),
    /// Repair and patch the existing config only.
    Patch(PathOpts),
    /// Probe a model catalog and print what would be configured.
    Models(ModelsOpts),
    /// Print the credential set onboarding would use.
    AuthChoice,
    Version,
}

#[derive(clap::Args)]
pub struct BootOpts {
    #[command(flatten)]
    pub paths: PathOpts,
    /// Print the launch command instead of starting the gateway.
    #[arg(long)]
    pub no_launch: bool,
}

/// Command-line overrides for [`crate::config::BootConfig`].
#[derive(clap::Args, Default)]
pub struct PathOpts {
    #[arg(long)]
    pub config_dir: Option<String>,
    #[arg(long)]
    pub backup_dir: Option<String>,
    #[arg(long)]
    pub skills_dir: Option<String>,
    #[arg(long)]
    pub gateway_bin: Option<String>,
}

#[derive(clap::Args)]
pub struct ModelsOpts {
    /// Catalog base URL; defaults to the configured proxy.
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub api_key: Option<String>,
}

impl PathOpts {
    pub fn apply(&self, config: &mut crate::config::BootConfig) {
        if let Some(dir) = &self.config_dir {
            config.config_dir = dir.into();
        }
        if let Some(dir) = &self.backup_dir {
            config.backup_dir = dir.into();
        }
        if let Some(dir) = &self.skills_dir {
            config.skills_dir = dir.into();
        }
        if let Some(bin) = &self.gateway_bin {
            config.gateway_bin = bin.clone();
        }
    }
}
