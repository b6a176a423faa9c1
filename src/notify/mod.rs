//! Best-effort SMS alerting.
//!
//! On internal errors the bot can push a short text alert to an external
//! SMS gateway. Delivery is strictly best-effort: failures are logged and
//! otherwise ignored, and the feature is off unless configured.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// Configuration for the SMS side channel.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Gateway endpoint accepting a JSON POST.
    pub endpoint: String,

    /// Bearer token for the gateway.
    pub token: String,

    /// Destination phone number.
    pub recipient: String,
}

#[derive(Debug, Serialize)]
struct SmsMessage<'a> {
    to: &'a str,
    text: &'a str,
}

/// A client for the SMS gateway.
#[derive(Debug, Clone)]
pub struct SmsNotifier {
    http: reqwest::Client,
    config: SmsConfig,
}

impl SmsNotifier {
    const SEND_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(config: SmsConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Self::SEND_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Delivers a short text alert. Never fails the caller.
    pub async fn alert(&self, text: &str) {
        let message = SmsMessage {
            to: &self.config.recipient,
            text,
        };
        let result = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .json(&message)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "SMS gateway rejected alert");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "SMS alert delivery failed"),
        }
    }
}
