//! Weathercore - weather lookups and conversational state for the weather bot
//!
//! Everything here is independent of Telegram: the bot crate feeds inbound
//! text into the dispatcher and delivers whatever replies come back.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, metrics and retry
//! - `weather`: weatherapi.com client, response models and reply formatting
//! - `storage`: Chat state and statistics stores (Postgres and in-memory)
//! - `dialog`: Command table, input validators and the dispatcher

pub mod core;
pub mod dialog;
pub mod storage;
pub mod weather;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use dialog::{Command, Dispatcher, Inbound};
pub use storage::{ChatState, ChatStore, PgStore, StatisticEntry, StatisticStore};
pub use weather::{WeatherApiClient, WeatherError, WeatherProvider};
