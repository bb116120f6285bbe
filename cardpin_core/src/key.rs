use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Stable identifier of a card, used as the join key between the image
/// folder, the catalog and every result mapping.
///
/// Keys are kept as strings because that is how they appear in the
/// persisted mappings. Canonical decimal keys (`"0"`, `"42"`, but not
/// `"042"`) order numerically and sort before every other key, so a
/// mapping iterates `9, 10, 100, abc` rather than `10, 100, 9, abc`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardKey(String);

impl CardKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value of a canonical decimal key.
    pub fn as_number(&self) -> Option<u64> {
        let s = self.0.as_str();
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s.len() == 1 || !s.starts_with('0'));
        if canonical { s.parse().ok() } else { None }
    }
}

impl Ord for CardKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CardKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CardKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CardKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for CardKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
