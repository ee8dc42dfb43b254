//! In-memory fakes for the store and messenger seams.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::bot::{Messenger, Reply};
use crate::notion::{Block, Error, Filter, NewPage, Page, TaskStore};
use crate::notion::types::ChildPage;

/// Task store backed by a fixed page list.
#[derive(Default)]
pub struct FakeStore {
    pages: Vec<(Page, String)>,
    fail_all: bool,
    failing_blocks: HashSet<String>,
    untitled: HashSet<String>,
    filters: Mutex<Vec<Filter>>,
    created: Mutex<Vec<NewPage>>,
}

impl FakeStore {
    /// Pages given as `(id, title)`; urls are derived from ids.
    pub fn with_pages(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(id, title)| {
                    let page = Page {
                        id: id.to_string(),
                        url: format!("https://www.notion.so/{id}"),
                    };
                    (page, title.to_string())
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self { fail_all: true, ..Default::default() }
    }

    pub fn failing_block(mut self, id: &str) -> Self {
        self.failing_blocks.insert(id.to_string());
        self
    }

    pub fn untitled(mut self, id: &str) -> Self {
        self.untitled.insert(id.to_string());
        self
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewPage> {
        self.created.lock().unwrap().clone()
    }

    fn unavailable() -> Error {
        Error::Api {
            status: 503,
            code: "service_unavailable".into(),
            message: "store unavailable".into(),
        }
    }
}

#[async_trait]
impl TaskStore for FakeStore {
    async fn query(&self, filter: &Filter) -> Result<Vec<Page>, Error> {
        self.filters.lock().unwrap().push(filter.clone());
        if self.fail_all {
            return Err(Self::unavailable());
        }
        Ok(self.pages.iter().map(|(p, _)| p.clone()).collect())
    }

    async fn retrieve_block(&self, block_id: &str) -> Result<Block, Error> {
        if self.fail_all || self.failing_blocks.contains(block_id) {
            return Err(Self::unavailable());
        }
        let (_, title) = self
            .pages
            .iter()
            .find(|(p, _)| p.id == block_id)
            .ok_or_else(|| Error::Api {
                status: 404,
                code: "object_not_found".into(),
                message: block_id.to_string(),
            })?;
        let child_page = if self.untitled.contains(block_id) {
            None
        } else {
            Some(ChildPage { title: title.clone() })
        };
        Ok(Block {
            id: block_id.to_string(),
            kind: "child_page".into(),
            child_page,
        })
    }

    async fn create_page(&self, page: &NewPage) -> Result<Page, Error> {
        if self.fail_all {
            return Err(Self::unavailable());
        }
        let mut created = self.created.lock().unwrap();
        created.push(page.clone());
        let id = format!("new-{}", created.len());
        Ok(Page {
            url: format!("https://www.notion.so/{id}"),
            id,
        })
    }
}

/// Messenger that records every reply.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, Reply)>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, r)| r.text).collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<i64, String> {
        if self.fail {
            return Err("Failed to send: network down".into());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, reply));
        Ok(sent.len() as i64)
    }
}
