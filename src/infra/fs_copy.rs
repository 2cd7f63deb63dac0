//! Whole-tree merge copies used by the restore path.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Copy every entry under `src` into `dest`.
///
/// Files present in both are overwritten; files only present in `dest` are
/// left alone. Returns the number of files written.
pub fn merge_copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Cannot create directory '{}'", dest.display()))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("Cannot walk '{}'", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Cannot create directory '{}'", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "Cannot copy '{}' to '{}'",
                entry.path().display(),
                target.display()
            )
        })?;
        copied += 1;
    }

    Ok(copied)
}

/// True when `dir` exists and has at least one entry.
pub fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
