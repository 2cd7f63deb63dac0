//! Restore decisions: should backup data replace local data on this boot?

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use super::layout::{AssetClass, BackupLayout, CopyPlan, LayoutResolver};
use crate::config::{BootConfig, BACKUP_SKILLS_SUBDIR};
use crate::infra::fs_copy::merge_copy_tree;
use crate::infra::sync_marker::marker_epoch_at;

/// Outcome of [`RestoreEngine::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreDecision {
    pub should_restore: bool,
    pub layout: BackupLayout,
    pub backup_epoch: i64,
    pub local_epoch: i64,
}

/// What a restore actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub asset: AssetClass,
    pub layout: BackupLayout,
    pub restored: bool,
    pub files_copied: usize,
    pub renamed: bool,
}

/// Decides and performs restores for one naming scheme.
#[derive(Debug, Clone)]
pub struct RestoreEngine {
    namespace: String,
    legacy_namespace: String,
    marker_name: String,
}

impl RestoreEngine {
    pub fn new(
        namespace: impl Into<String>,
        legacy_namespace: impl Into<String>,
        marker_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            legacy_namespace: legacy_namespace.into(),
            marker_name: marker_name.into(),
        }
    }

    pub fn from_config(config: &BootConfig) -> Self {
        Self::new(
            &config.namespace,
            &config.legacy_namespace,
            &config.marker_name,
        )
    }

    fn resolver<'a>(&'a self, backup_root: &'a Path) -> LayoutResolver<'a> {
        LayoutResolver::new(
            backup_root,
            &self.namespace,
            &self.legacy_namespace,
            BACKUP_SKILLS_SUBDIR,
        )
    }

    /// Decide whether `asset` at `local_root` should be restored from
    /// `backup_root`.
    ///
    /// Restores only when a layout is present and the backup marker is
    /// strictly newer than the local one.
    pub fn decide(&self, asset: AssetClass, local_root: &Path, backup_root: &Path) -> RestoreDecision {
        let layout = self.resolver(backup_root).detect(asset);
        if layout == BackupLayout::Absent {
            return RestoreDecision {
                should_restore: false,
                layout,
                backup_epoch: 0,
                local_epoch: 0,
            };
        }

        let backup_epoch = marker_epoch_at(&backup_root.join(&self.marker_name));
        let local_epoch = marker_epoch_at(&local_root.join(&self.marker_name));
        let should_restore = backup_epoch > local_epoch;

        info!(
            %asset,
            ?layout,
            backup_epoch,
            local_epoch,
            should_restore,
            "restore decision"
        );

        RestoreDecision {
            should_restore,
            layout,
            backup_epoch,
            local_epoch,
        }
    }

    /// Decide, then copy backup data over `local_root` if warranted.
    pub fn restore(&self, asset: AssetClass, local_root: &Path, backup_root: &Path) -> Result<RestoreReport> {
        let decision = self.decide(asset, local_root, backup_root);
        let mut report = RestoreReport {
            asset,
            layout: decision.layout,
            restored: false,
            files_copied: 0,
            renamed: false,
        };

        if !decision.should_restore {
            return Ok(report);
        }

        let Some(plan) = self.resolver(backup_root).plan(asset, decision.layout, local_root) else {
            return Ok(report);
        };

        report.files_copied = self.execute(&plan, backup_root)?;
        report.renamed = apply_rename(&plan)?;
        report.restored = true;

        info!(
            %asset,
            layout = ?decision.layout,
            files = report.files_copied,
            renamed = report.renamed,
            "restored from backup"
        );
        Ok(report)
    }

    fn execute(&self, plan: &CopyPlan, backup_root: &Path) -> Result<usize> {
        let copied = merge_copy_tree(&plan.source, &plan.destination)?;

        let marker_src = backup_root.join(&self.marker_name);
        let marker_dest = plan.destination.join(&self.marker_name);
        if marker_src.is_file() {
            std::fs::copy(&marker_src, &marker_dest).with_context(|| {
                format!("Cannot copy sync marker to '{}'", marker_dest.display())
            })?;
        }

        Ok(copied)
    }
}

/// Rename a legacy-named file unless the current name already exists.
fn apply_rename(plan: &CopyPlan) -> Result<bool> {
    let Some(rename) = &plan.rename else {
        return Ok(false);
    };

    let from = plan.destination.join(&rename.from);
    let to = plan.destination.join(&rename.to);
    if to.exists() {
        debug!(path = %to.display(), "current config already present, keeping it");
        return Ok(false);
    }
    if !from.is_file() {
        return Ok(false);
    }

    std::fs::rename(&from, &to)
        .with_context(|| format!("Cannot rename '{}' to '{}'", from.display(), to.display()))?;
    info!(from = %rename.from, to = %rename.to, "migrated legacy config name");
    Ok(true)
}
