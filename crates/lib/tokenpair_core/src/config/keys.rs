//! Signing key resolution.

use std::io::Write;
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::info;

use super::ConfigError;

/// Length of generated signing keys.
const GENERATED_KEY_LEN: usize = 64;

/// Generate a random alphanumeric signing key.
pub fn generate_key() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Resolve a signing key: env var `var` → persisted file `file_name` in the
/// user data dir → freshly generated (and persisted) key.
pub fn resolve_signing_key(var: &str, file_name: &str) -> Result<String, ConfigError> {
    if let Ok(key) = std::env::var(var)
        && !key.is_empty()
    {
        return Ok(key);
    }
    load_or_generate(&key_dir(), file_name)
}

/// Read `dir/file_name`, or write a new key there when missing or empty.
pub fn load_or_generate(dir: &Path, file_name: &str) -> Result<String, ConfigError> {
    let path = dir.join(file_name);
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    let key = generate_key();
    std::fs::create_dir_all(dir)?;
    write_private(&path, &key)?;
    info!(path = %path.display(), "generated new signing key");
    Ok(key)
}

/// Write `contents` readable by the owner only.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on creation; a pre-existing blank file keeps its bits.
        let mut file = options.open(path)?;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(contents.as_bytes())
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(contents.as_bytes())
    }
}

/// Directory holding persisted signing keys.
fn key_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tokenpair")
}
