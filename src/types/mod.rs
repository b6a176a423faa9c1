//! Core domain types for the newcomer bot.

mod ids;

pub use ids::{ChangeId, GroupName, RevisionId, Username};
