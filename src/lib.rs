//! Newcomer Bot - a Gerrit bot that welcomes first-time contributors.
//!
//! The bot watches the review platform's event stream for newly uploaded
//! patchsets, classifies each uploader by historical patch count, and
//! manages the welcome review and the newcomers group accordingly.

pub mod classify;
pub mod config;
pub mod effects;
pub mod events;
pub mod gerrit;
pub mod notify;
pub mod types;
pub mod watcher;
pub mod worker;
