//! Telegram Bot API plumbing: bot construction, webhook registration,
//! update conversion and reply delivery.

pub mod bot;
pub mod sender;
pub mod update;

pub use bot::{create_bot, register_webhook, setup_bot_commands};
pub use sender::send_replies;
pub use update::to_inbound;
