use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::storage::StorageName;

/// Number of random bytes in a share token.
const SHARE_ID_BYTES: usize = 16;

/// Opaque unguessable token identifying one immutable [`ShareRecord`].
///
/// 128 bits from the OS-seeded RNG, hex-encoded. The token is the only
/// access-control mechanism for a share, so it is never allocated
/// sequentially.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareId([u8; SHARE_ID_BYTES]);

impl ShareId {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SHARE_ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse a hex-encoded share token.
    pub fn from_hex(s: &str) -> Result<Self, ShareIdError> {
        if s.len() != SHARE_ID_BYTES * 2 {
            return Err(ShareIdError::Length(s.len()));
        }

        let bytes = hex::decode(s).map_err(|_| ShareIdError::NotHex)?;
        let arr: [u8; SHARE_ID_BYTES] = bytes
            .try_into()
            .map_err(|_| ShareIdError::Length(s.len()))?;

        Ok(Self(arr))
    }

    /// Return the token as a 32-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Rejection reasons for a malformed share token.
#[derive(Debug, thiserror::Error)]
pub enum ShareIdError {
    #[error("expected 32 hex characters, got {0}")]
    Length(usize),
    #[error("token is not valid hex")]
    NotHex,
}

impl fmt::Debug for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareId({})", self.to_hex())
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ShareId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ShareId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// One uploaded file inside a share record.
///
/// Immutable after creation; its lifetime is the lifetime of the enclosing
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Opaque handle resolvable to the stored bytes.
    pub storage_name: StorageName,
    /// User-supplied display name. Never trusted as a path.
    pub original_name: String,
    pub category: Option<Category>,
}

/// A minted share: an ordered, append-only set of uploaded files.
///
/// Created with at least one entry and never mutated afterwards. Order is
/// upload order and is significant for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: ShareId,
    pub files: Vec<FileEntry>,
    pub created_at: DateTime<Utc>,
}

impl ShareRecord {
    /// Construct a record. Returns `None` for an empty file list.
    pub fn new(id: ShareId, files: Vec<FileEntry>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        Some(Self {
            id,
            files,
            created_at: Utc::now(),
        })
    }
}
