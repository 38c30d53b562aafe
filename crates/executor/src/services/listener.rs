use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::debug;

use crate::context::AppContext;

/// Handles one post from the monitored channel: trade signals go to the
/// dispatcher, other text is relayed as-is, photos are re-sent with their
/// caption.
pub async fn handle_channel_post(
    bot: Bot,
    msg: Message,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    if msg.chat.title() != Some(ctx.config.signal_channel.as_str()) {
        return Ok(());
    }

    let destination = ChatId(ctx.config.telegram_chat_id);

    if let Some(text) = msg.text() {
        let upper = text.to_uppercase();
        if upper.contains("LONG") || upper.contains("SHORT") {
            ctx.notifier.notify("Signal received");
            ctx.dispatcher.dispatch(upper);
        } else {
            bot.send_message(destination, format!("InfoMsg: {text}"))
                .await?;
        }
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        let mut request = bot.send_photo(destination, InputFile::file_id(photo.file.id.clone()));
        if let Some(caption) = msg.caption() {
            request = request.caption(caption.to_string());
        }
        request.await?;
    } else {
        debug!("Ignoring channel message without text or photo");
    }

    Ok(())
}
