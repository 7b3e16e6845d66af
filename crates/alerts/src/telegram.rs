//! Telegram bot handlers.

use crate::commands::CommandHandler;
use crate::notifier::{AlertError, AlertSink};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "Analyse a token contract. Usage: /run <contract>")]
    Run(String),
    #[command(description = "List tracked tokens")]
    ListTracked,
    #[command(description = "List verified influencers")]
    ListVerified,
    #[command(description = "Track a hashtag. Usage: /track $PEPE")]
    Track(String),
    #[command(description = "Stop tracking a hashtag. Usage: /untrack $PEPE")]
    Untrack(String),
    #[command(description = "Show help")]
    Help,
}

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    alert_chat: ChatId,
}

impl TelegramBot {
    /// Create a bot that posts alerts to `alert_chat`.
    pub fn new(token: &str, alert_chat: i64) -> Self {
        Self {
            bot: Bot::new(token),
            alert_chat: ChatId(alert_chat),
        }
    }

    /// Publish the command list so clients can suggest it.
    pub async fn register_commands(&self) -> Result<(), AlertError> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        Ok(())
    }

    /// Run the dispatcher until Ctrl-C.
    pub async fn run(self: Arc<Self>, handler: CommandHandler) {
        let bot = self.bot.clone();
        let command_handler = handler.clone();

        let tree = Update::filter_message()
            .branch(dptree::entry().filter_command::<Command>().endpoint(
                move |bot: Bot, msg: Message, cmd: Command| {
                    let handler = command_handler.clone();
                    async move { handle_command(bot, msg, cmd, handler).await }
                },
            ))
            .branch(dptree::filter(is_human_text).endpoint(move |bot: Bot, msg: Message| {
                let handler = handler.clone();
                async move { handle_message(bot, msg, handler).await }
            }));

        info!(chat_id = %self.alert_chat, "Telegram dispatcher started");
        Dispatcher::builder(bot, tree)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
        info!("Telegram dispatcher stopped");
    }
}

#[async_trait]
impl AlertSink for TelegramBot {
    async fn send_alert(&self, text: &str) -> Result<(), AlertError> {
        self.bot.send_message(self.alert_chat, text).await?;
        Ok(())
    }
}

/// Text messages sent by people; bots (this one included) are ignored.
fn is_human_text(msg: Message) -> bool {
    let from_human = msg.from.as_ref().map(|user| !user.is_bot).unwrap_or(false);
    from_human && msg.text().is_some()
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, handler: CommandHandler) -> Result<(), AlertError> {
    debug!(chat_id = %msg.chat.id, command = ?cmd, "Command received");

    let reply = match cmd {
        Command::Run(contract) => handler.run(&contract).await,
        Command::ListTracked => handler.list_tracked(),
        Command::ListVerified => handler.list_verified(),
        Command::Track(hashtag) => handler.track(&hashtag),
        Command::Untrack(hashtag) => handler.untrack(&hashtag),
        Command::Help => Command::descriptions().to_string(),
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, handler: CommandHandler) -> Result<(), AlertError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    for reply in handler.scan_message(text).await {
        bot.send_message(msg.chat.id, reply).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/run 0xabc", "lurker_bot").unwrap(),
            Command::Run("0xabc".to_string())
        );
        assert_eq!(Command::parse("/list_tracked", "lurker_bot").unwrap(), Command::ListTracked);
        assert_eq!(Command::parse("/list_verified", "lurker_bot").unwrap(), Command::ListVerified);
        assert_eq!(
            Command::parse("/untrack $PEPE", "lurker_bot").unwrap(),
            Command::Untrack("$PEPE".to_string())
        );
        assert!(Command::parse("/price 50", "lurker_bot").is_err());
    }

    #[test]
    fn test_help_lists_commands() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/list_tracked"));
        assert!(help.contains("/untrack"));
    }
}
