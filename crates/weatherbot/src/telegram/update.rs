use teloxide::types::{Update, UpdateKind};
use weathercore::Inbound;

/// The text message carried by `update`, if any.
///
/// Edited messages, callbacks, media without a caption and every other
/// update kind yield `None`.
pub fn to_inbound(update: &Update) -> Option<Inbound> {
    let UpdateKind::Message(message) = &update.kind else {
        return None;
    };
    let text = message.text()?;

    Some(Inbound {
        chat_id: message.chat.id.0,
        text: text.to_string(),
        first_name: message.from.as_ref().map(|user| user.first_name.clone()).unwrap_or_default(),
        date: message.date.timestamp(),
    })
}
