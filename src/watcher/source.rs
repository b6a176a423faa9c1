//! Event stream sources.
//!
//! [`EventSource`] is the transport seam of the watcher: production streams
//! the platform's events endpoint over HTTP; tests substitute a canned line
//! stream. Gerrit's native `stream-events` runs over SSH, but its contract
//! at this layer is identical: a long-lived connection delivering one JSON
//! event per line.

use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::io::StreamReader;

/// Error establishing an event stream connection.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The HTTP request failed or the server refused it.
    #[error("event stream request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A source of newline-delimited event records.
pub trait EventSource: Send + Sync {
    /// The line stream produced by a successful connection. Items are
    /// `Err` when the connection drops mid-read.
    type Lines: Stream<Item = io::Result<String>> + Send + Unpin;

    /// The error returned by a failed connection attempt.
    type Error: fmt::Display + Send;

    /// Establishes a fresh streaming connection.
    fn connect(&self) -> impl Future<Output = Result<Self::Lines, Self::Error>> + Send;
}

/// Streams events from a Gerrit HTTP events endpoint with basic auth.
///
/// The embedded client deliberately has no whole-request timeout: the
/// response body is an endless stream. Only connection establishment is
/// bounded.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    http: reqwest::Client,
    events_url: String,
    username: String,
    password: String,
}

impl HttpEventSource {
    /// Connect-phase timeout; the stream itself is unbounded.
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(
        events_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Self::CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            events_url: events_url.into(),
            username: username.into(),
            password: password.into(),
        })
    }
}

impl EventSource for HttpEventSource {
    type Lines = LinesStream<StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>>;
    type Error = StreamError;

    async fn connect(&self) -> Result<Self::Lines, StreamError> {
        let response = self
            .http
            .get(&self.events_url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?;

        let bytes = response
            .bytes_stream()
            .map_err(io::Error::other)
            .boxed();
        Ok(LinesStream::new(StreamReader::new(bytes).lines()))
    }
}
