use teloxide::prelude::*;

/// Sends `replies` to the chat one after another, keeping their order.
///
/// Stops at the first failure; the rest would most likely fail the same way.
pub async fn send_replies(bot: &Bot, chat_id: i64, replies: &[String]) -> Result<(), teloxide::RequestError> {
    for reply in replies {
        bot.send_message(ChatId(chat_id), reply.as_str()).await?;
    }
    log::debug!("Chat {}: {} replies sent", chat_id, replies.len());
    Ok(())
}
