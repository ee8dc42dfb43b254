//! Response and request shapes for the Notion API.
//!
//! Only the fields this bot reads are modelled. Responses are validated at
//! deserialization: a page without an `id` or `url` is a parse error, not a
//! silently empty entry.

use serde::Deserialize;
use serde_json::{json, Value};

/// One page of results from `POST /databases/{id}/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database record as returned by query and create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: String,
    pub url: String,
}

/// Result of `GET /blocks/{id}`. Only `child_page` blocks carry a title.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub child_page: Option<ChildPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChildPage {
    pub title: String,
}

impl Block {
    pub fn into_title(self) -> Option<String> {
        self.child_page.map(|p| p.title)
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Properties of a record to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPage {
    pub title: String,
    pub horizon: String,
}

impl NewPage {
    /// Body for `POST /pages` under the given database.
    pub fn to_json(&self, database_id: &str) -> Value {
        json!({
            "parent": { "type": "database_id", "database_id": database_id },
            "properties": {
                "title": { "title": [ { "text": { "content": self.title } } ] },
                "Horizon": { "select": { "name": self.horizon } },
            }
        })
    }
}

/// A record reduced to what gets displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleEntry {
    pub url: String,
    pub title: Option<String>,
}
