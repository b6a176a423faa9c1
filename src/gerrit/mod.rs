//! Gerrit REST integration: client, error taxonomy, and the production
//! effect interpreter.

mod client;
mod error;
mod interpreter;

pub use client::GerritClient;
pub use error::{GerritApiError, GerritErrorKind};
