//! Conversation handling: command table, prompt validation and routing.

pub mod command;
pub mod dispatcher;
pub mod input;

pub use command::Command;
pub use dispatcher::{Dispatcher, Inbound};
pub use input::{ForecastDate, InputError};
