//! Handlers behind each action.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bot::{add_entry_data, Action, AuthGate, Button, Keyboard, Messenger, Reply};
use crate::format;
use crate::notion::TaskStore;
use crate::tasks;

/// Where an action came from.
#[derive(Debug, Clone, Copy)]
pub struct Incoming {
    pub chat_id: i64,
    pub user_id: u64,
    /// The user's own message, if the action came from one.
    pub message_id: Option<i64>,
}

pub struct Handlers {
    store: Arc<dyn TaskStore>,
    messenger: Arc<dyn Messenger>,
    auth: AuthGate,
    commands: Vec<(String, String)>,
}

impl Handlers {
    pub fn new(
        store: Arc<dyn TaskStore>,
        messenger: Arc<dyn Messenger>,
        auth: AuthGate,
        commands: Vec<(String, String)>,
    ) -> Self {
        Self { store, messenger, auth, commands }
    }

    pub async fn handle(&self, from: &Incoming, action: Action) {
        if self.auth.is_rejected(from.user_id).await {
            debug!("Ignoring {:?} from rejected user {}", action, from.user_id);
            return;
        }

        let chat_id = from.chat_id;
        match action {
            Action::Start { first_name } => {
                if !self.auth.is_authorized(from.user_id) {
                    info!("Rejecting /start from unauthorized user {}", from.user_id);
                    self.reply(chat_id, Reply::plain(format::UNAUTHORIZED)).await;
                    self.auth.reject(from.user_id).await;
                    return;
                }
                self.reply(chat_id, Reply::html(format::welcome(&first_name))).await;
            }
            Action::Menu => {
                self.reply(chat_id, Reply::plain(format::MENU).with_keyboard(menu())).await;
            }
            Action::Ping => {
                self.reply(chat_id, Reply::plain(format::PONG)).await;
            }
            Action::Show(view) => {
                self.reply(chat_id, Reply::plain(format::LOADING)).await;
                let entries = tasks::fetch_view(self.store.as_ref(), view).await;
                let text = format::entries(view.heading(), &entries);
                self.reply(chat_id, Reply::html(text)).await;
            }
            Action::Commands => {
                let text = format::commands(
                    self.commands.iter().map(|(name, desc)| (name.as_str(), desc.as_str())),
                );
                self.reply(chat_id, Reply::plain(text)).await;
            }
            Action::Propose(text) => {
                let reply = Reply::html(format::proposal(&text))
                    .with_keyboard(proposal_buttons(&text))
                    .replying_to(from.message_id);
                self.reply(chat_id, reply).await;
            }
            Action::PromptNewEntry => {
                self.reply(chat_id, Reply::plain(format::NEW_ENTRY_PROMPT)).await;
            }
            Action::AddEntry(text) => {
                if let Some(page) = tasks::add_entry(self.store.as_ref(), &text).await {
                    self.reply(chat_id, Reply::html(format::added(&page.url, &text))).await;
                }
            }
            Action::Cancel => {
                self.reply(chat_id, Reply::plain(format::CANCELLED)).await;
            }
        }
    }

    async fn reply(&self, chat_id: i64, reply: Reply) {
        // Send failures are logged by the messenger.
        self.messenger.send(chat_id, reply).await.ok();
    }
}

fn menu() -> Keyboard {
    Keyboard {
        rows: vec![
            vec![
                Button::new("Current actions", "/live"),
                Button::new("New entry", "/new_entry"),
            ],
            vec![
                Button::new("Unsorted", "/unsorted"),
                Button::new("Stuff to sort", "/stuff_to_sort"),
            ],
            vec![Button::new("My commands", "/commands")],
        ],
    }
}

fn proposal_buttons(text: &str) -> Keyboard {
    Keyboard {
        rows: vec![vec![
            Button::new("Add", add_entry_data(text)),
            Button::new("Cancel", "/cancel"),
        ]],
    }
}
