//! Store-assigned entity identifiers.
//!
//! Identifiers are 12 bytes rendered as a 24-character lowercase hex token:
//! a big-endian 4-byte creation timestamp (seconds since the Unix epoch)
//! followed by 8 random bytes.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Number of raw bytes in an [`EntityId`].
pub const ENTITY_ID_BYTES: usize = 12;

/// Length of the hex rendering of an [`EntityId`].
pub const ENTITY_ID_HEX_LEN: usize = ENTITY_ID_BYTES * 2;

/// Unique identifier of a series or comic document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId([u8; ENTITY_ID_BYTES]);

/// Error returned when a string is not a well-formed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEntityIdError {
    #[error("identifier is empty")]
    Empty,
    #[error("'{0}' is not a 24-character hex identifier")]
    Malformed(String),
}

impl EntityId {
    /// Generate a fresh identifier for a document being inserted.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4();

        let mut bytes = [0u8; ENTITY_ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
        Self(bytes)
    }

    /// Seconds since the Unix epoch encoded in the leading bytes.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseEntityIdError::Empty);
        }
        if s.len() != ENTITY_ID_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseEntityIdError::Malformed(s.to_string()));
        }

        let mut bytes = [0u8; ENTITY_ID_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| ParseEntityIdError::Malformed(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
