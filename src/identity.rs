//! Per-installation device identity.
//!
//! The identity is an opaque string stored in a single file. It is created
//! the first time it is needed and then read back on every start; it never
//! expires and is never regenerated. It only partitions the history log and
//! must not be treated as a user account.

use anyhow::{Context, Result};
use shift_lookup_core::models::DeviceId;
use std::path::Path;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Read the identity at `path`, creating and persisting one if absent.
pub fn resolve_or_create(path: &Path) -> Result<DeviceId> {
    if let Some(existing) = read_identity(path)? {
        return Ok(existing);
    }

    let id = generate(chrono::Utc::now().timestamp_millis());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create identity directory: {}", parent.display())
            })?;
        }
    }
    std::fs::write(path, id.as_str())
        .with_context(|| format!("Failed to write device identity: {}", path.display()))?;

    tracing::info!(device = %id, path = %path.display(), "created device identity");
    Ok(id)
}

fn read_identity(path: &Path) -> Result<Option<DeviceId>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            Ok((!trimmed.is_empty()).then(|| DeviceId::new(trimmed)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to read device identity: {}", path.display())),
    }
}

/// `dev_<epoch ms>_<9 base-36 chars>`.
fn generate(now_ms: i64) -> DeviceId {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| SUFFIX_ALPHABET[*b as usize % SUFFIX_ALPHABET.len()] as char)
        .collect();
    DeviceId::new(format!("dev_{}_{}", now_ms, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_format() {
        let id = generate(1_700_000_000_000);
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "dev");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_created_once_then_reused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("device_id");

        let first = resolve_or_create(&path).unwrap();
        assert!(path.exists());
        let second = resolve_or_create(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_identity_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device_id");
        std::fs::write(&path, "dev_1_abc\n").unwrap();
        assert_eq!(resolve_or_create(&path).unwrap(), DeviceId::new("dev_1_abc"));
    }

    #[test]
    fn test_blank_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device_id");
        std::fs::write(&path, "  \n").unwrap();
        let id = resolve_or_create(&path).unwrap();
        assert!(id.as_str().starts_with("dev_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), id.as_str());
    }
}
