use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of leading shards that become nested directories in the working
/// directory layout.
pub const PATH_SHARDS: usize = 4;

/// Repository identifier for a work or file set.
///
/// Identifiers are assigned by the repository on first persist. Because they
/// also become filesystem path segments, only ASCII alphanumerics, `-` and
/// `_` are accepted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Validate and wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidId {
                id,
                reason: "identifier must not be empty".into(),
            });
        }
        if let Some(ch) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(TypeError::InvalidId {
                reason: format!("contains forbidden character: {ch:?}"),
                id,
            });
        }
        Ok(Self(id))
    }

    /// Mint a fresh, time-ordered identifier (UUID v7, simple hex form).
    pub fn mint() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the identifier into successive two-character shards. The last
    /// shard is a single character when the length is odd.
    ///
    /// ```
    /// use folio_types::EntityId;
    ///
    /// let id = EntityId::new("abcd123").unwrap();
    /// assert_eq!(id.shards(), vec!["ab", "cd", "12", "3"]);
    /// ```
    pub fn shards(&self) -> Vec<&str> {
        // Identifiers are ASCII-only, so byte offsets are char boundaries.
        self.0
            .as_bytes()
            .chunks(2)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect()
    }

    /// The shards used as nested directory names (at most [`PATH_SHARDS`]).
    pub fn path_shards(&self) -> Vec<&str> {
        let mut shards = self.shards();
        shards.truncate(PATH_SHARDS);
        shards
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shards_even_length() {
        let id = EntityId::new("abcd1234").unwrap();
        assert_eq!(id.shards(), vec!["ab", "cd", "12", "34"]);
        assert_eq!(id.path_shards(), vec!["ab", "cd", "12", "34"]);
    }

    #[test]
    fn path_shards_truncate_long_ids() {
        let id = EntityId::new("x633f104m").unwrap();
        assert_eq!(id.shards(), vec!["x6", "33", "f1", "04", "m"]);
        assert_eq!(id.path_shards(), vec!["x6", "33", "f1", "04"]);
    }

    #[test]
    fn short_ids_have_fewer_shards() {
        let id = EntityId::new("abc").unwrap();
        assert_eq!(id.path_shards(), vec!["ab", "c"]);
    }

    #[test]
    fn rejects_empty_and_path_characters() {
        assert!(EntityId::new("").is_err());
        assert!(EntityId::new("ab/cd").is_err());
        assert!(EntityId::new("..").is_err());
        assert!(EntityId::new("a b").is_err());
    }

    #[test]
    fn minted_ids_are_valid_and_distinct() {
        let a = EntityId::mint();
        let b = EntityId::mint();
        assert_ne!(a, b);
        assert!(EntityId::new(a.as_str()).is_ok());
    }

    #[test]
    fn serde_rejects_invalid_ids() {
        let ok: Result<EntityId, _> = serde_json::from_str("\"abc123\"");
        assert!(ok.is_ok());
        let bad: Result<EntityId, _> = serde_json::from_str("\"../etc\"");
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn shards_reassemble_to_id(raw in "[a-z0-9_-]{1,40}") {
            let id = EntityId::new(raw.clone()).unwrap();
            let shards = id.shards();
            prop_assert_eq!(shards.concat(), raw);
            prop_assert!(shards.iter().all(|s| !s.is_empty() && s.len() <= 2));
            prop_assert!(id.path_shards().len() <= PATH_SHARDS);
        }
    }
}
