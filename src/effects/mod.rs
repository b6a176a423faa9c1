//! Effects-as-data for Gerrit operations.
//!
//! This module defines effect types that describe remote operations without
//! executing them. This enables:
//! - Dispatch logic that can be tested against a recording mock
//! - Logging/tracing of intended operations
//! - A single seam (the interpreter) between the bot and the platform
//!
//! The production interpreter lives in [`crate::gerrit`].

mod interpreter;

pub use interpreter::GerritInterpreter;

use crate::types::{ChangeId, GroupName, RevisionId, Username};

/// A Gerrit API operation, described as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GerritEffect {
    /// Count the changes owned by an account.
    CountOwnedChanges { owner: Username },

    /// List the reviewers currently registered on a change.
    ///
    /// Used as the idempotency check before posting a welcome: an uploader
    /// should receive the welcome message at most once ever.
    ListChangeReviewers { change: ChangeId },

    /// Post the welcome message on a revision and register the greeter
    /// account as reviewer, in one review call.
    PostWelcomeReview {
        change: ChangeId,
        revision: RevisionId,
        message: String,
        reviewer: Username,
    },

    /// Create the group if the platform does not already have it.
    /// An already-existing group is a no-op, not an error.
    EnsureGroup { group: GroupName },

    /// Add an account to a group. Adding an existing member is a no-op.
    AddGroupMember { group: GroupName, member: Username },

    /// List the members of a group.
    ///
    /// Used before removal so that an account that is not in the group does
    /// not trigger a spurious removal call.
    ListGroupMembers { group: GroupName },

    /// Remove an account from a group.
    RemoveGroupMember { group: GroupName, member: Username },
}

/// The response to an interpreted [`GerritEffect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GerritResponse {
    /// Number of changes owned by the queried account.
    ChangeCount(u64),

    /// Reviewer handles registered on a change.
    Reviewers(Vec<Username>),

    /// Member handles of a group.
    Members(Vec<Username>),

    /// The effect completed and carries no data.
    Done,
}
