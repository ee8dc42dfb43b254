//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, ReplyParameters,
};
use tracing::{info, warn};

use crate::bot::{Keyboard, Messenger, Reply};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn send_message(&self, chat_id: i64, reply: Reply) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), reply.text);

        if reply.html {
            request = request.parse_mode(ParseMode::Html);
        }

        if let Some(keyboard) = reply.keyboard {
            request = request.reply_markup(inline_keyboard(keyboard));
        }

        if let Some(msg_id) = reply.reply_to {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Register the command list shown in the client's command menu.
    pub async fn publish_commands(&self, commands: Vec<BotCommand>) -> Result<(), String> {
        info!("Publishing {} commands", commands.len());

        self.bot.set_my_commands(commands).await.map_err(|e| {
            let msg = format!("Failed to set commands: {e}");
            warn!("{}", msg);
            msg
        })?;

        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<i64, String> {
        self.send_message(chat_id, reply).await
    }
}

fn inline_keyboard(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|b| InlineKeyboardButton::callback(b.label, b.data))
            .collect::<Vec<_>>()
    }))
}
