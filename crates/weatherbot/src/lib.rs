//! Weatherbot - Telegram front end of the weather bot
//!
//! Receives updates over a webhook, hands the text to the `weathercore`
//! dispatcher and sends the replies back through the Bot API. Also serves
//! the read-only analytics API and Prometheus metrics.
//!
//! # Module Structure
//!
//! - `telegram`: Bot creation, webhook registration, update model, reply delivery
//! - `server`: axum routers for the webhook, analytics and metrics
//! - `cli`: Command line interface

pub mod cli;
pub mod server;
pub mod telegram;

pub use server::{router, AppState};
