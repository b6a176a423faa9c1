use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newcomer_bot::config::Config;
use newcomer_bot::gerrit::GerritClient;
use newcomer_bot::notify::SmsNotifier;
use newcomer_bot::watcher::{EventWatcher, HttpEventSource};
use newcomer_bot::worker::{run_consumer, DispatchConfig, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newcomer_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        gerrit = %config.gerrit_base_url,
        group = %config.newcomer_group,
        "starting newcomer bot"
    );

    let gerrit = GerritClient::new(
        config.gerrit_base_url.clone(),
        config.gerrit_username.clone(),
        config.gerrit_password.clone(),
    )?;

    let source = HttpEventSource::new(
        config.gerrit_events_url.clone(),
        config.gerrit_username.clone(),
        config.gerrit_password.clone(),
    )?;

    let notifier = match config.sms.clone() {
        Some(sms) => Some(SmsNotifier::new(sms)?),
        None => None,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        });
    }

    let watcher = EventWatcher::new(source, tx, config.reconnect_delay);
    let watcher_task = tokio::spawn(watcher.run(shutdown.clone()));

    let dispatcher = Dispatcher::new(
        gerrit,
        DispatchConfig {
            newcomer_group: config.newcomer_group.clone(),
            greeter: config.greeter.clone(),
            welcome_message: config.welcome_message.clone(),
        },
    );

    run_consumer(dispatcher, rx, notifier, shutdown.clone()).await;

    shutdown.cancel();
    let _ = watcher_task.await;

    Ok(())
}
