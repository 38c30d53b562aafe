use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Drains the process-wide notification channel into the destination chat.
/// Delivery failures are logged and skipped so a Telegram outage never
/// stalls an order workflow.
pub struct NotificationService {
    bot: Bot,
    chat_id: ChatId,
}

impl NotificationService {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    pub async fn start(self, mut rx: mpsc::Receiver<String>) {
        info!("Starting Telegram notification service");

        while let Some(msg) = rx.recv().await {
            if let Err(e) = self.bot.send_message(self.chat_id, msg).await {
                error!("Failed to send Telegram message: {}", e);
            }
        }

        info!("Notification channel closed. Stopping service.");
    }
}
