//! Telegram transport implementation using teloxide.
//!
//! Wraps the Telegram Bot API for placeholder delivery. Chat and message
//! identifiers travel as strings through [`MessageRef`] and are parsed back
//! into Telegram's numeric forms here.
//!
//! # Example
//!
//! ```rust,ignore
//! use pensive::transports::TelegramTransport;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(TelegramTransport::new("YOUR_BOT_TOKEN"));
//! ```

use crate::error::{TransportError, TransportResult};
use crate::transport::{MessageRef, Transport};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::debug;

/// Transport backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    /// Create a transport with the given bot token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Create a transport around an existing bot handle, sharing its
    /// connection pool with the rest of the application.
    #[must_use]
    pub const fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }

    /// Try to create a transport from the `TELEGRAM_BOT_TOKEN` environment
    /// variable.
    #[must_use]
    pub fn try_from_env() -> Option<Self> {
        std::env::var("TELEGRAM_BOT_TOKEN").ok().map(Self::new)
    }

    fn chat(chat_id: &str) -> TransportResult<ChatId> {
        chat_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| TransportError::InvalidId(chat_id.to_string()))
    }

    fn ids(message: &MessageRef) -> TransportResult<(ChatId, MessageId)> {
        let chat = Self::chat(&message.chat_id)?;
        let id = message
            .message_id
            .parse::<i32>()
            .map(MessageId)
            .map_err(|_| TransportError::InvalidId(message.message_id.clone()))?;
        Ok((chat, id))
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, chat_id: &str, text: &str) -> TransportResult<MessageRef> {
        let chat = Self::chat(chat_id)?;
        let sent = self
            .bot
            .send_message(chat, text)
            .await
            .map_err(|e| TransportError::send(e.to_string()))?;

        debug!(chat_id = %chat_id, message_id = sent.id.0, "placeholder sent");
        Ok(MessageRef::new(sent.id.0.to_string(), chat_id))
    }

    async fn edit(&self, message: &MessageRef, text: &str) -> TransportResult<()> {
        let (chat, id) = Self::ids(message)?;
        self.bot
            .edit_message_text(chat, id, text)
            .await
            .map_err(|e| TransportError::edit(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, message: &MessageRef) -> TransportResult<()> {
        let (chat, id) = Self::ids(message)?;
        self.bot
            .delete_message(chat, id)
            .await
            .map_err(|e| TransportError::delete(e.to_string()))?;
        Ok(())
    }
}
