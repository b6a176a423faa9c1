//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifier types (e.g.
//! using a GroupName where a Username is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Gerrit account handle (the `username` field of an account).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn new(s: impl Into<String>) -> Self {
        Username(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the handle carries no characters.
    ///
    /// Stream events occasionally contain accounts with an empty `username`;
    /// those are never valid uploader identities.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Username(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Username(s.to_string())
    }
}

/// A change identifier.
///
/// Gerrit accepts several identifier forms (numeric id, triplet, Change-Id
/// hash); the bot passes through whatever the event carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub String);

impl ChangeId {
    pub fn new(s: impl Into<String>) -> Self {
        ChangeId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChangeId {
    fn from(s: &str) -> Self {
        ChangeId(s.to_string())
    }
}

/// A patchset revision identifier (commit SHA of the uploaded patchset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(pub String);

impl RevisionId {
    pub fn new(s: impl Into<String>) -> Self {
        RevisionId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(s: &str) -> Self {
        RevisionId(s.to_string())
    }
}

/// The name of a Gerrit group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(pub String);

impl GroupName {
    pub fn new(s: impl Into<String>) -> Self {
        GroupName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupName {
    fn from(s: &str) -> Self {
        GroupName(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod username {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(s in "[a-zA-Z][a-zA-Z0-9_.-]{0,30}") {
                let name = Username::new(&s);
                let json = serde_json::to_string(&name).unwrap();
                let parsed: Username = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(name, parsed);
            }

            #[test]
            fn comparison_matches_underlying(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
                prop_assert_eq!(Username::new(&a) == Username::new(&b), a == b);
            }
        }

        #[test]
        fn empty_handle_is_detected() {
            assert!(Username::new("").is_empty());
            assert!(!Username::new("srish").is_empty());
        }
    }

    #[test]
    fn display_is_transparent() {
        assert_eq!(format!("{}", Username::new("alice")), "alice");
        assert_eq!(format!("{}", ChangeId::new("I44ed4a")), "I44ed4a");
        assert_eq!(format!("{}", GroupName::new("Newcomers")), "Newcomers");
    }
}
