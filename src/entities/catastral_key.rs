//! Catastral key identity: `NNN-NN-NNN-NN-NN-<alnum>`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Digit count of each numeric segment, in order
const NUMERIC_SEGMENTS: [usize; 5] = [3, 2, 3, 2, 2];

/// Human-readable key layout for error messages and hints
pub const CATASTRAL_KEY_FORMAT: &str = "NNN-NN-NNN-NN-NN-<alphanumeric>";

/// A validated catastral key, e.g. `123-45-678-90-12-AB1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatastralKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid catastral key '{value}': expected {}", CATASTRAL_KEY_FORMAT)]
pub struct CatastralKeyError {
    pub value: String,
}

impl CatastralKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != NUMERIC_SEGMENTS.len() + 1 {
        return false;
    }

    let numeric_ok = parts
        .iter()
        .zip(NUMERIC_SEGMENTS)
        .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_digit()));

    let unit = parts[NUMERIC_SEGMENTS.len()];
    numeric_ok && !unit.is_empty() && unit.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl FromStr for CatastralKey {
    type Err = CatastralKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CatastralKeyError {
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for CatastralKey {
    type Error = CatastralKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(CatastralKeyError { value })
        }
    }
}

impl From<CatastralKey> for String {
    fn from(key: CatastralKey) -> Self {
        key.0
    }
}

impl fmt::Display for CatastralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
