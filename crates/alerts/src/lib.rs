//! Chat alerts and command handling.
//!
//! - `format` - alert and reply texts
//! - `notifier` - the `AlertSink` seam and alert delivery
//! - `commands` - transport-independent command and message handlers
//! - `telegram` - Telegram dispatcher and alert sink

pub mod commands;
pub mod format;
pub mod notifier;
pub mod telegram;

pub use commands::CommandHandler;
pub use format::*;
pub use notifier::{AlertError, AlertSink, Notifier};
pub use telegram::{Command, TelegramBot};
