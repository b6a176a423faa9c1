//! The event watcher: producer half of the bot.
//!
//! Holds a streaming connection to the review platform, parses each line as
//! an event record, and forwards patchset-created events to the dispatcher
//! over an unbounded channel. On any connection, read, or parse failure it
//! logs, drops the connection, sleeps a fixed delay, and reconnects from
//! scratch. No backoff, no circuit breaker; the stream is the one resource
//! worth waiting forever for.

mod source;

pub use source::{EventSource, HttpEventSource, StreamError};

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::events::{parse_event_line, PatchsetCreatedEvent};

/// Default pause between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// What to do with the connection after handling one stream line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAction {
    /// Keep reading from the current connection.
    Continue,

    /// The line did not parse; the connection state is suspect, so tear it
    /// down and reconnect after the fixed delay.
    Reconnect,

    /// The consumer is gone; stop the watcher entirely.
    Stop,
}

/// Watches the platform's event stream and feeds the dispatcher.
pub struct EventWatcher<S> {
    source: S,
    tx: mpsc::UnboundedSender<PatchsetCreatedEvent>,
    reconnect_delay: Duration,
}

impl<S: EventSource> EventWatcher<S> {
    pub fn new(
        source: S,
        tx: mpsc::UnboundedSender<PatchsetCreatedEvent>,
        reconnect_delay: Duration,
    ) -> Self {
        EventWatcher {
            source,
            tx,
            reconnect_delay,
        }
    }

    /// Runs until cancelled or until the consumer side of the channel is
    /// dropped.
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            let connect = tokio::select! {
                _ = shutdown.cancelled() => return,
                result = self.source.connect() => result,
            };

            match connect {
                Ok(mut lines) => {
                    info!("connected to event stream");
                    if !self.consume(&mut lines, &shutdown).await {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "event stream connection failed"),
            }

            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    /// Drains one connection. Returns false when the watcher should stop
    /// entirely (shutdown or consumer gone), true to reconnect.
    async fn consume(&self, lines: &mut S::Lines, shutdown: &CancellationToken) -> bool {
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => return false,
                line = lines.next() => line,
            };

            match next {
                Some(Ok(line)) => match forward_line(&line, &self.tx) {
                    LineAction::Continue => {}
                    LineAction::Reconnect => return true,
                    LineAction::Stop => return false,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "event stream read failed");
                    return true;
                }
                None => {
                    warn!("event stream closed by server");
                    return true;
                }
            }
        }
    }
}

/// Parses one stream line and forwards any patchset-created event.
///
/// Other event kinds are ignored. A line that does not parse is treated
/// like a broken connection: the caller tears the stream down and
/// reconnects rather than trusting whatever bytes follow.
fn forward_line(line: &str, tx: &mpsc::UnboundedSender<PatchsetCreatedEvent>) -> LineAction {
    if line.trim().is_empty() {
        return LineAction::Continue;
    }
    match parse_event_line(line) {
        Ok(Some(event)) => {
            if tx.send(event).is_err() {
                warn!("event consumer is gone; stopping watcher");
                return LineAction::Stop;
            }
            LineAction::Continue
        }
        Ok(None) => LineAction::Continue,
        Err(e) => {
            warn!(error = %e, "unparseable event line; dropping connection");
            LineAction::Reconnect
        }
    }
}
