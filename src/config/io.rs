use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

/// Maximum size for a config file (10 MB).
pub const MAX_CONFIG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Parse a JSON5 configuration string.
pub fn parse_config_json5(content: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = json5::from_str(content)?;
    Ok(value)
}

/// Parse document text: strict JSON first, JSON5 as a fallback for
/// hand-edited files.
pub fn parse_document_text(content: &str) -> Result<serde_json::Value> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => parse_config_json5(content)
            .with_context(|| format!("Not valid JSON ({json_err}) nor JSON5")),
    }
}

/// Read a settings file, picking the format from its extension.
///
/// Symlinked files and files over [`MAX_CONFIG_FILE_BYTES`] are rejected.
pub fn read_config_file_snapshot(path: &Path) -> Result<serde_json::Value> {
    let metadata = std::fs::symlink_metadata(path)
        .with_context(|| format!("Cannot stat config file '{}'", path.display()))?;

    if metadata.file_type().is_symlink() {
        bail!(
            "Config file '{}' is a symlink, refusing to follow",
            path.display()
        );
    }

    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        bail!(
            "Config file '{}' is {} bytes, exceeds limit of {} bytes",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_BYTES,
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("json");

    match ext {
        "yaml" | "yml" => {
            let value: serde_json::Value = serde_yaml::from_str(&content)?;
            Ok(value)
        }
        "toml" => {
            let value: serde_json::Value = toml::from_str(&content)?;
            Ok(value)
        }
        _ => parse_config_json5(&content),
    }
}

/// SHA-256 of the canonical serialization, for change detection.
pub fn resolve_config_snapshot_hash(value: &serde_json::Value) -> String {
    use sha2::{Digest, Sha256};
    let canonical = serde_json::to_string(value).unwrap_or_default();
    let hash = Sha256::digest(canonical.as_bytes());
    hex::encode(hash)
}

/// Write `config` as pretty JSON, atomically.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers only ever see the old or the new document.
pub fn write_config_file(path: &Path, config: &serde_json::Value) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;

    let mut content = serde_json::to_string_pretty(config)?;
    content.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Cannot create temp file in '{}'", parent.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Cannot replace '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn read_json5_settings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("boot.json");
        fs::write(&file, "{ // comment\n namespace: 'openclaw', }").unwrap();

        let config = read_config_file_snapshot(&file).unwrap();
        assert_eq!(config["namespace"], "openclaw");
    }

    #[test]
    fn read_toml_settings() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("boot.toml");
        fs::write(&file, "catalogTimeoutSecs = 4\n").unwrap();

        let config = read_config_file_snapshot(&file).unwrap();
        assert_eq!(config["catalogTimeoutSecs"], 4);
    }

    #[test]
    fn reject_oversized_config() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("huge.json");
        let content = "x".repeat((MAX_CONFIG_FILE_BYTES + 1) as usize);
        fs::write(&file, content).unwrap();

        let result = read_config_file_snapshot(&file);
        assert!(result.unwrap_err().to_string().contains("exceeds limit"));
    }

    #[cfg(unix)]
    #[test]
    fn reject_symlinked_config() {
        let dir = TempDir::new().unwrap();
        let real_file = dir.path().join("real.json");
        let symlink = dir.path().join("link.json");
        fs::write(&real_file, "{}").unwrap();
        std::os::unix::fs::symlink(&real_file, &symlink).unwrap();

        let result = read_config_file_snapshot(&symlink);
        assert!(result.unwrap_err().to_string().contains("symlink"));
    }

    #[test]
    fn document_text_accepts_json5_fallback() {
        assert_eq!(parse_document_text(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert_eq!(parse_document_text("{a: 1,}").unwrap()["a"], 1);
        assert!(parse_document_text("{not json").is_err());
    }

    #[test]
    fn write_replaces_whole_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested/openclaw.json");
        write_config_file(&file, &serde_json::json!({"a": 1, "b": [1, 2]})).unwrap();
        write_config_file(&file, &serde_json::json!({"c": true})).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"c": true}));

        let leftovers: Vec<_> = fs::read_dir(file.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.path() != file)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn hash_tracks_content() {
        let a = serde_json::json!({"key": "value"});
        let b = serde_json::json!({"key": "other"});
        assert_eq!(resolve_config_snapshot_hash(&a), resolve_config_snapshot_hash(&a));
        assert_ne!(resolve_config_snapshot_hash(&a), resolve_config_snapshot_hash(&b));
    }
}
