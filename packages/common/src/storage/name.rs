use std::fmt;

use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Random suffix bytes in a generated storage name.
const SUFFIX_BYTES: usize = 6;

/// Longest accepted storage name.
const MAX_LEN: usize = 255;

/// A validated, opaque storage file name.
///
/// Format: `{unix-millis}-{random hex}-{sanitized original name}`. The
/// timestamp plus random suffix makes names unique under concurrent uploads
/// without coordination; the sanitized tail keeps the user's filename (and
/// extension) visible in download URLs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageName(String);

impl StorageName {
    /// Generate a fresh unique name for an uploaded file.
    pub fn generate(original_name: &str) -> Self {
        let mut suffix = [0u8; SUFFIX_BYTES];
        rand::rng().fill_bytes(&mut suffix);

        Self(format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            hex::encode(suffix),
            sanitize_file_name(original_name),
        ))
    }

    /// Validate an existing name, e.g. read back from a persisted record.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() {
            return Err(StorageError::InvalidName("empty name".into()));
        }
        if s.len() > MAX_LEN {
            return Err(StorageError::InvalidName(format!(
                "name exceeds {MAX_LEN} characters"
            )));
        }
        if s.contains('/') || s.contains('\\') {
            return Err(StorageError::InvalidName(
                "path separators are not allowed".into(),
            ));
        }
        if s.chars().any(|c| c.is_ascii_control()) {
            return Err(StorageError::InvalidName(
                "control characters are not allowed".into(),
            ));
        }
        if s.chars().all(|c| c == '.') {
            return Err(StorageError::InvalidName(
                "name must not be only dots".into(),
            ));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageName({})", self.0)
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StorageName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StorageName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Reduce an attacker-controlled filename to something safe to embed in a
/// storage name.
///
/// Strips path separators, null bytes and other control characters, then
/// trims whitespace. A name that sanitizes to nothing (or to dots only)
/// becomes `"file"` so the storage name stays well-formed.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_ascii_control())
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return "file".to_string();
    }

    trimmed.chars().take(128).collect()
}
