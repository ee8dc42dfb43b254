//! Notion task store - filter builder, response schema and REST client.

pub mod client;
pub mod filter;
pub mod types;

use async_trait::async_trait;

pub use client::NotionClient;
pub use filter::{Condition, Filter};
pub use types::{Block, NewPage, Page, TitleEntry};

/// The database operations the bot needs.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every page matching `filter`, in the store's native order.
    async fn query(&self, filter: &Filter) -> Result<Vec<Page>, Error>;

    async fn retrieve_block(&self, block_id: &str) -> Result<Block, Error>;

    async fn create_page(&self, page: &NewPage) -> Result<Page, Error>;
}

#[derive(Debug)]
pub enum Error {
    Http(String),
    Api { status: u16, code: String, message: String },
    Parse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api { status, code, message } => {
                write!(f, "API error {status} ({code}): {message}")
            }
            Error::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for Error {}
