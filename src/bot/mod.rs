//! Chat front end - command/callback routing and replies.

pub mod auth;
pub mod handlers;
pub mod telegram;


use async_trait::async_trait;
use teloxide::utils::command::{BotCommands, ParseError};

use crate::tasks::View;

pub use auth::AuthGate;
pub use handlers::{Handlers, Incoming};
pub use telegram::TelegramClient;

/// Telegram caps callback data at 64 bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

pub const NEW_ENTRY_PREFIX: &str = "new_entry";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum Command {
    /// Deep-link payloads (`/start <payload>`) are accepted and ignored.
    #[command(description = "check access and say hello", parse_with = start_payload)]
    Start(String),
    #[command(description = "open the menu")]
    Menu,
    #[command(description = "check the bot is alive")]
    Ping,
    #[command(description = "current actions")]
    Live,
    #[command(description = "unsorted inbox stuff")]
    Stuff,
    #[command(description = "stuff to sort")]
    ToSort,
    #[command(description = "list my commands")]
    Commands,
}

fn start_payload(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

/// What the user asked for, independent of how it arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start { first_name: String },
    Menu,
    Ping,
    Show(View),
    Commands,
    /// Free text offered as a new entry.
    Propose(String),
    PromptNewEntry,
    AddEntry(String),
    Cancel,
}

impl Action {
    pub fn from_command(command: Command, first_name: &str) -> Self {
        match command {
            Command::Start(_) => Action::Start { first_name: first_name.to_string() },
            Command::Menu => Action::Menu,
            Command::Ping => Action::Ping,
            Command::Live => Action::Show(View::Actions),
            Command::Stuff => Action::Show(View::Unsorted),
            Command::ToSort => Action::Show(View::StuffToSort),
            Command::Commands => Action::Commands,
        }
    }

    /// Parse inline-button callback data.
    ///
    /// `replied_text` is the text of the message the button's message replies
    /// to; it stands in for the entry text when that did not fit in the data.
    pub fn from_callback(data: &str, replied_text: Option<&str>) -> Option<Self> {
        match data {
            "/live" => return Some(Action::Show(View::Actions)),
            "/unsorted" => return Some(Action::Show(View::Unsorted)),
            "/stuff_to_sort" => return Some(Action::Show(View::StuffToSort)),
            "/commands" => return Some(Action::Commands),
            "/cancel" => return Some(Action::Cancel),
            "/new_entry" => return Some(Action::PromptNewEntry),
            _ => {}
        }

        let rest = data.strip_prefix(NEW_ENTRY_PREFIX)?;
        match rest.strip_prefix(':') {
            Some(text) => Some(Action::AddEntry(text.to_string())),
            None if rest.is_empty() => replied_text.map(|t| Action::AddEntry(t.to_string())),
            None => None,
        }
    }
}

/// Callback data for the "Add" button of a proposal.
pub fn add_entry_data(text: &str) -> String {
    let data = format!("{NEW_ENTRY_PREFIX}:{text}");
    if data.len() <= MAX_CALLBACK_DATA {
        data
    } else {
        NEW_ENTRY_PREFIX.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: &str, data: impl Into<String>) -> Self {
        Self { label: label.to_string(), data: data.into() }
    }
}

/// Inline keyboard, row by row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

/// An outgoing chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub html: bool,
    pub keyboard: Option<Keyboard>,
    pub reply_to: Option<i64>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), html: false, keyboard: None, reply_to: None }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self { text: text.into(), html: true, keyboard: None, reply_to: None }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn replying_to(mut self, message_id: Option<i64>) -> Self {
        self.reply_to = message_id;
        self
    }
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send `reply` to `chat_id`, returning the new message id.
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<i64, String>;
}

/// `(name, description)` for every registered command.
pub fn command_list() -> Vec<(String, String)> {
    Command::bot_commands()
        .into_iter()
        .map(|c| (c.command, c.description))
        .collect()
}
