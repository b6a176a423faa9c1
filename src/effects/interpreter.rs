//! The effect interpreter trait.
//!
//! The trait-based design enables mock interpreters for testing the
//! dispatcher without a Gerrit server; the production implementation is
//! [`crate::gerrit::GerritClient`].

use std::future::Future;

use super::{GerritEffect, GerritResponse};

/// Interprets Gerrit effects against the review platform.
///
/// An interpreter instance owns whatever session/credential state it needs;
/// the dispatcher receives one by injection and never touches transport
/// details.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct MockGerrit {
///     calls: Mutex<Vec<GerritEffect>>,
/// }
///
/// impl GerritInterpreter for MockGerrit {
///     type Error = String;
///
///     async fn interpret(&self, effect: GerritEffect) -> Result<GerritResponse, Self::Error> {
///         self.calls.lock().unwrap().push(effect);
///         Ok(GerritResponse::Done)
///     }
/// }
/// ```
pub trait GerritInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a Gerrit effect and return its response.
    fn interpret(
        &self,
        effect: GerritEffect,
    ) -> impl Future<Output = Result<GerritResponse, Self::Error>> + Send;
}
