//! The consumer half of the bot: the dispatcher and its event loop.

mod dispatch;
#[cfg(test)]
mod tests;

pub use dispatch::{DispatchConfig, DispatchOutcome, Dispatcher};

use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::effects::GerritInterpreter;
use crate::events::PatchsetCreatedEvent;
use crate::notify::SmsNotifier;

/// Receives events one at a time and hands each to the dispatcher,
/// completing all remote calls for an event before pulling the next.
///
/// Failed events raise a best-effort alert when a notifier is configured;
/// the loop itself never dies on an event.
pub async fn run_consumer<I>(
    dispatcher: Dispatcher<I>,
    mut rx: mpsc::UnboundedReceiver<PatchsetCreatedEvent>,
    notifier: Option<SmsNotifier>,
    shutdown: CancellationToken,
) where
    I: GerritInterpreter,
    I::Error: fmt::Display,
{
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("consumer shutting down");
                return;
            }
            event = rx.recv() => match event {
                Some(event) => event,
                None => {
                    info!("event channel closed; consumer stopping");
                    return;
                }
            },
        };

        let outcome = dispatcher.handle_event(&event).await;
        debug!(?outcome, uploader = %event.uploader, "event handled");

        if outcome.is_failure() {
            if let Some(notifier) = &notifier {
                notifier
                    .alert(&format!(
                        "newcomer-bot: failed handling patchset from {} ({:?})",
                        event.uploader, outcome
                    ))
                    .await;
            }
        }
    }
}
