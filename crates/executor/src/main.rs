use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use teloxide::prelude::*;
use tracing::info;

use common::config::Config;
use common::logger;
use common::notify::Notifier;
use engine::monitor::MonitorSettings;
use engine::orchestrator::Orchestrator;
use exchange::BinanceFuturesClient;

use crate::context::AppContext;
use crate::dispatch::SignalDispatcher;
use crate::services::notifier::NotificationService;

mod context;
mod dispatch;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();

    let config = Config::from_env()?;
    info!(
        "Starting signal executor for channel {:?}",
        config.signal_channel
    );

    let (notifier, notification_rx) = Notifier::channel(256);

    let bot = Bot::new(config.telegram_bot_token.clone());
    let delivery = NotificationService::new(bot.clone(), ChatId(config.telegram_chat_id));
    let delivery_handle = tokio::spawn(delivery.start(notification_rx));

    let exchange = Arc::new(BinanceFuturesClient::from_config(&config));
    let monitor = MonitorSettings {
        poll_interval: config.poll_interval,
        timeout: config.monitor_timeout,
    };
    let orchestrator = Arc::new(Orchestrator::new(exchange, notifier.clone(), monitor));
    let dispatcher = SignalDispatcher::new(
        orchestrator,
        notifier.clone(),
        config.max_concurrent_signals,
    );

    let ctx = Arc::new(AppContext {
        config,
        notifier: notifier.clone(),
        dispatcher,
    });

    notifier.notify("Bot started");

    let handler = Update::filter_channel_post().endpoint(services::listener::handle_channel_post);
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    notifier.notify("Bot stopped");
    drop(notifier);

    // Give the delivery task a moment to flush; workers may still hold
    // notifier clones, so don't wait on them indefinitely.
    let _ = tokio::time::timeout(Duration::from_secs(5), delivery_handle).await;
    Ok(())
}
