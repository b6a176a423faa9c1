//! Gerrit stream event parser.
//!
//! This module parses raw stream-event lines into typed
//! [`PatchsetCreatedEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event kind is read from the `type` field
//! 2. Kinds other than `patchset-created` return `Ok(None)` (ignored, not
//!    an error)
//! 3. The uploader handle is taken from the typed schema when present, with
//!    a recursive whole-event search for `username` as a fallback (the
//!    account's location varies across Gerrit versions)
//! 4. Malformed payloads and payloads with no usable uploader return `Err`

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::events::extract;
use crate::types::{ChangeId, RevisionId, Username};

/// A patchset-created occurrence, reduced to the fields the bot acts on.
///
/// Transient: consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchsetCreatedEvent {
    /// Handle of the account that uploaded the patchset.
    pub uploader: Username,

    /// The change the patchset belongs to.
    pub change: ChangeId,

    /// The uploaded revision.
    pub revision: RevisionId,
}

/// Error type for stream event parsing failures.
#[derive(Debug, Error)]
pub enum EventParseError {
    /// JSON deserialization failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent or empty in every known location.
    #[error("event is missing a usable {field}")]
    MissingField { field: &'static str },
}

// Raw payload structures for deserialization.
//
// These match Gerrit's stream-events JSON. Fields are `Option` liberally to
// survive schema drift across server versions; required fields are validated
// explicitly afterwards.

#[derive(Debug, Deserialize)]
struct RawStreamEvent {
    #[serde(rename = "type")]
    kind: String,
    change: Option<RawChange>,
    #[serde(rename = "patchSet")]
    patch_set: Option<RawPatchSet>,
    uploader: Option<RawAccount>,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    id: Option<String>,
    owner: Option<RawAccount>,
}

#[derive(Debug, Deserialize)]
struct RawPatchSet {
    revision: Option<String>,
    uploader: Option<RawAccount>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    username: Option<String>,
}

/// Parses one stream-event line.
///
/// # Returns
///
/// * `Ok(Some(event))` - a patchset-created event with all fields resolved
/// * `Ok(None)` - some other event kind (ignored, not an error)
/// * `Err(e)` - malformed payload or no usable uploader/change/revision
pub fn parse_event_line(line: &str) -> Result<Option<PatchsetCreatedEvent>, EventParseError> {
    let value: Value = serde_json::from_str(line)?;
    let raw = RawStreamEvent::deserialize(&value)?;

    if raw.kind != "patchset-created" {
        return Ok(None);
    }

    let uploader = resolve_uploader(&raw, &value)
        .ok_or(EventParseError::MissingField { field: "uploader username" })?;

    let change = raw
        .change
        .as_ref()
        .and_then(|c| c.id.as_deref())
        .filter(|id| !id.is_empty())
        .ok_or(EventParseError::MissingField { field: "change id" })?;

    let revision = raw
        .patch_set
        .as_ref()
        .and_then(|p| p.revision.as_deref())
        .filter(|rev| !rev.is_empty())
        .ok_or(EventParseError::MissingField { field: "revision" })?;

    Ok(Some(PatchsetCreatedEvent {
        uploader,
        change: ChangeId::new(change),
        revision: RevisionId::new(revision),
    }))
}

/// Resolves the uploader handle, preferring the typed schema locations.
///
/// Candidate order: the patchset's uploader, the top-level uploader, then
/// the change owner. If none of those carry a non-empty `username`, fall
/// back to a recursive search of the whole event.
fn resolve_uploader(raw: &RawStreamEvent, value: &Value) -> Option<Username> {
    let typed = [
        raw.patch_set.as_ref().and_then(|p| p.uploader.as_ref()),
        raw.uploader.as_ref(),
        raw.change.as_ref().and_then(|c| c.owner.as_ref()),
    ];
    for account in typed.into_iter().flatten() {
        if let Some(username) = account.username.as_deref() {
            if !username.is_empty() {
                return Some(Username::new(username));
            }
        }
    }

    extract::first_non_empty(value, "username").map(Username::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCHSET_CREATED: &str = r#"{
        "type": "patchset-created",
        "change": {
            "project": "mediawiki/core",
            "branch": "master",
            "id": "I8437bfbb4febd2fc6fdd196ded2ce86089f3e647",
            "owner": { "name": "Alice", "username": "alice" }
        },
        "patchSet": {
            "number": 1,
            "revision": "674ac754f91e64a0efb8087e59a176484bd534d1",
            "uploader": { "name": "Alice", "username": "alice" }
        },
        "uploader": { "name": "Alice", "username": "alice" }
    }"#;

    #[test]
    fn parses_patchset_created() {
        let event = parse_event_line(PATCHSET_CREATED).unwrap().unwrap();
        assert_eq!(event.uploader, Username::new("alice"));
        assert_eq!(
            event.change,
            ChangeId::new("I8437bfbb4febd2fc6fdd196ded2ce86089f3e647")
        );
        assert_eq!(
            event.revision,
            RevisionId::new("674ac754f91e64a0efb8087e59a176484bd534d1")
        );
    }

    #[test]
    fn other_event_kinds_are_ignored() {
        let line = r#"{ "type": "ref-updated", "refUpdate": { "project": "p" } }"#;
        assert_eq!(parse_event_line(line).unwrap(), None);
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(parse_event_line("not json at all").is_err());
    }

    #[test]
    fn uploader_found_via_fallback_search() {
        // No account in any typed location, but a username buried in an
        // unexpected spot. The recursive fallback must still find it.
        let line = r#"{
            "type": "patchset-created",
            "change": {
                "id": "I0123",
                "owner": { "name": "Bob", "username": "" }
            },
            "patchSet": {
                "revision": "deadbeef",
                "author": { "username": "bob" }
            }
        }"#;
        let event = parse_event_line(line).unwrap().unwrap();
        assert_eq!(event.uploader, Username::new("bob"));
    }

    #[test]
    fn missing_uploader_everywhere_is_an_error() {
        let line = r#"{
            "type": "patchset-created",
            "change": { "id": "I0123" },
            "patchSet": { "revision": "deadbeef" }
        }"#;
        let err = parse_event_line(line).unwrap_err();
        assert!(matches!(err, EventParseError::MissingField { .. }));
    }

    #[test]
    fn missing_change_id_is_an_error() {
        let line = r#"{
            "type": "patchset-created",
            "change": { "owner": { "username": "carol" } },
            "patchSet": { "revision": "deadbeef" }
        }"#;
        let err = parse_event_line(line).unwrap_err();
        assert!(matches!(
            err,
            EventParseError::MissingField { field: "change id" }
        ));
    }
}
