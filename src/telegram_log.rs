//! Forwards WARN and ERROR events to a Telegram chat.
//!
//! Store and delivery failures never surface in replies, so this is where
//! the operator sees them.

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Telegram rejects messages longer than 4096 characters.
const MAX_LOG_CHARS: usize = 4000;

pub struct TelegramLogLayer {
    tx: mpsc::UnboundedSender<String>,
}

impl TelegramLogLayer {
    /// Must be called from within a tokio runtime.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = bot.send_message(chat_id, truncate(&text)).await {
                    eprintln!("Failed to send log to Telegram: {e}");
                }
            }
        });

        Self { tx }
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_LOG_CHARS {
        let truncated: String = text.chars().take(MAX_LOG_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{} = {:?}", field.name(), value));
        }
    }
}

impl MessageVisitor {
    fn render(self, level: Level, target: &str) -> String {
        let prefix = if level == Level::ERROR { "❌" } else { "⚠️" };
        let mut line = format!("{prefix} [{target}] {}", self.message);
        if !self.fields.is_empty() {
            line.push_str(&format!(" ({})", self.fields.join(", ")));
        }
        line
    }
}

impl<S: Subscriber> Layer<S> for TelegramLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();

        if level > Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if self.tx.send(visitor.render(level, metadata.target())).is_err() {
            eprintln!("Log channel closed, message dropped");
        }
    }
}
