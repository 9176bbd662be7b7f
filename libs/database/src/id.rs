use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Length of every record identifier.
pub const RECORD_ID_LEN: usize = 8;

/// URL-safe alphabet used for generated identifiers.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Opaque identifier for a stored record.
///
/// Identifiers are 8-character URL-safe tokens, generated once at creation
/// and stable for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[schema(value_type = String, example = "k3N-9xQa")]
pub struct RecordId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseRecordIdError {
    #[error("record id must be exactly {RECORD_ID_LEN} characters, got {0}")]
    Length(usize),

    #[error("record id contains invalid character '{0}'")]
    Charset(char),
}

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token: String = (0..RECORD_ID_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != RECORD_ID_LEN {
            return Err(ParseRecordIdError::Length(s.len()));
        }
        if let Some(bad) = s.chars().find(|c| !ALPHABET.contains(&(*c as u8)) || !c.is_ascii()) {
            return Err(ParseRecordIdError::Charset(bad));
        }
        Ok(Self(s.to_string()))
    }
}
