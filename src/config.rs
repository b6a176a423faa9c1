//! Bot configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::notify::SmsConfig;
use crate::types::{GroupName, Username};
use crate::watcher::DEFAULT_RECONNECT_DELAY;

/// Fallback welcome text; override with `WELCOME_MESSAGE`.
const DEFAULT_WELCOME_MESSAGE: &str = "Thank you for making your first contribution! \
     A greeter has been added as reviewer and will help you get your change merged. \
     Welcome aboard!";

/// Everything the bot needs to run, resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the Gerrit instance, e.g. `https://gerrit.example.org`.
    pub gerrit_base_url: String,

    /// URL of the streaming events endpoint.
    pub gerrit_events_url: String,

    /// HTTP credentials for the bot account.
    pub gerrit_username: String,
    pub gerrit_password: String,

    /// Group that tags newcomer accounts.
    pub newcomer_group: GroupName,

    /// Account registered as reviewer on first-time changes.
    pub greeter: Username,

    /// Welcome text for first-time contributors.
    pub welcome_message: String,

    /// Pause between event stream reconnect attempts.
    pub reconnect_delay: Duration,

    /// Optional SMS alert side channel; enabled only when all three SMS
    /// variables are set.
    pub sms: Option<SmsConfig>,
}

impl Config {
    /// Loads configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let gerrit_base_url = env::var("GERRIT_BASE_URL")
            .context("GERRIT_BASE_URL environment variable is required")?
            .trim_end_matches('/')
            .to_string();

        let gerrit_events_url = env::var("GERRIT_EVENTS_URL")
            .unwrap_or_else(|_| format!("{}/a/events", gerrit_base_url));

        let gerrit_username = env::var("GERRIT_BOT_USERNAME")
            .context("GERRIT_BOT_USERNAME environment variable is required")?;

        let gerrit_password = env::var("GERRIT_BOT_PASSWORD")
            .context("GERRIT_BOT_PASSWORD environment variable is required")?;

        let newcomer_group = GroupName::new(
            env::var("NEWCOMER_GROUP").unwrap_or_else(|_| "Newcomers".to_string()),
        );

        let greeter = Username::new(
            env::var("GREETER_ACCOUNT").unwrap_or_else(|_| "first-time-greeter".to_string()),
        );

        let welcome_message =
            env::var("WELCOME_MESSAGE").unwrap_or_else(|_| DEFAULT_WELCOME_MESSAGE.to_string());

        let reconnect_delay = match env::var("RECONNECT_DELAY_SECS") {
            Ok(value) => Duration::from_secs(
                value
                    .parse::<u64>()
                    .context("RECONNECT_DELAY_SECS must be a whole number of seconds")?,
            ),
            Err(_) => DEFAULT_RECONNECT_DELAY,
        };

        let sms = match (
            env::var("SMS_ENDPOINT"),
            env::var("SMS_TOKEN"),
            env::var("SMS_RECIPIENT"),
        ) {
            (Ok(endpoint), Ok(token), Ok(recipient)) => Some(SmsConfig {
                endpoint,
                token,
                recipient,
            }),
            _ => None,
        };

        Ok(Config {
            gerrit_base_url,
            gerrit_events_url,
            gerrit_username,
            gerrit_password,
            newcomer_group,
            greeter,
            welcome_message,
            reconnect_delay,
            sms,
        })
    }
}
