//! Telegram delivery channel.
//!
//! Sends notification messages to one fixed chat via the Bot API.

pub mod client;

pub use client::{Notifier, SharedNotifier, TelegramClient};
