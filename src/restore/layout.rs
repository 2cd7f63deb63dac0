//! Backup layout detection.
//!
//! Backups written by different generations of the sync job put the
//! configuration in different places. Detection is by existence checks in a
//! fixed priority order; the first hit wins.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::infra::fs_copy::dir_has_entries;

/// Restorable asset classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Config,
    Skills,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Config => write!(f, "config"),
            AssetClass::Skills => write!(f, "skills"),
        }
    }
}

/// Shape of the data found under a backup root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupLayout {
    /// `<root>/<namespace>/<namespace>.json`
    Current,
    /// `<root>/<legacy>/<legacy>.json`
    LegacyNested,
    /// `<root>/<legacy>.json`
    LegacyFlat,
    Absent,
}

impl BackupLayout {
    pub fn is_legacy(self) -> bool {
        matches!(self, BackupLayout::LegacyNested | BackupLayout::LegacyFlat)
    }
}

/// Rename of a file inside the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRename {
    pub from: String,
    pub to: String,
}

/// What to copy where for one restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Applied after the copy, only if `to` does not exist yet.
    pub rename: Option<FileRename>,
}

/// Resolves layouts and copy plans under one backup root.
#[derive(Debug, Clone)]
pub struct LayoutResolver<'a> {
    backup_root: &'a Path,
    namespace: &'a str,
    legacy_namespace: &'a str,
    skills_subdir: &'a str,
}

impl<'a> LayoutResolver<'a> {
    pub fn new(
        backup_root: &'a Path,
        namespace: &'a str,
        legacy_namespace: &'a str,
        skills_subdir: &'a str,
    ) -> Self {
        Self {
            backup_root,
            namespace,
            legacy_namespace,
            skills_subdir,
        }
    }

    fn current_dir(&self) -> PathBuf {
        self.backup_root.join(self.namespace)
    }

    fn legacy_dir(&self) -> PathBuf {
        self.backup_root.join(self.legacy_namespace)
    }

    fn skills_dir(&self) -> PathBuf {
        self.backup_root.join(self.skills_subdir)
    }

    /// Detect the layout for `asset`.
    ///
    /// Skills have a single layout: `Current` when `<root>/skills` has
    /// entries, `Absent` otherwise.
    pub fn detect(&self, asset: AssetClass) -> BackupLayout {
        let layout = match asset {
            AssetClass::Config => self.detect_config(),
            AssetClass::Skills if dir_has_entries(&self.skills_dir()) => BackupLayout::Current,
            AssetClass::Skills => BackupLayout::Absent,
        };
        debug!(%asset, ?layout, root = %self.backup_root.display(), "backup layout");
        layout
    }

    fn detect_config(&self) -> BackupLayout {
        let current = self.current_dir().join(format!("{}.json", self.namespace));
        let legacy_nested = self
            .legacy_dir()
            .join(format!("{}.json", self.legacy_namespace));
        let legacy_flat = self
            .backup_root
            .join(format!("{}.json", self.legacy_namespace));

        if current.is_file() {
            BackupLayout::Current
        } else if legacy_nested.is_file() {
            BackupLayout::LegacyNested
        } else if legacy_flat.is_file() {
            BackupLayout::LegacyFlat
        } else {
            BackupLayout::Absent
        }
    }

    /// Copy plan restoring `layout` of `asset` into `destination`.
    pub fn plan(&self, asset: AssetClass, layout: BackupLayout, destination: &Path) -> Option<CopyPlan> {
        let source = match (asset, layout) {
            (_, BackupLayout::Absent) => return None,
            (AssetClass::Skills, _) => self.skills_dir(),
            (AssetClass::Config, BackupLayout::Current) => self.current_dir(),
            (AssetClass::Config, BackupLayout::LegacyNested) => self.legacy_dir(),
            (AssetClass::Config, BackupLayout::LegacyFlat) => self.backup_root.to_path_buf(),
        };

        let rename = (asset == AssetClass::Config && layout.is_legacy()).then(|| FileRename {
            from: format!("{}.json", self.legacy_namespace),
            to: format!("{}.json", self.namespace),
        });

        Some(CopyPlan {
            source,
            destination: destination.to_path_buf(),
            rename,
        })
    }
}
