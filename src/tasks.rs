//! Named views over the task database and entry creation.
//!
//! Store failures never reach the caller: a failed view is an empty list and a
//! failed create is `None`, with the cause logged.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{info, warn};

use crate::notion::filter::{self, HORIZON_IMMEDIATE};
use crate::notion::{Error, Filter, NewPage, Page, TaskStore, TitleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Actions,
    Unsorted,
    /// Same query as `Unsorted`, listed under its own heading.
    StuffToSort,
}

impl View {
    pub fn filter(self, now: DateTime<Utc>) -> Filter {
        match self {
            View::Actions => filter::actions(now),
            View::Unsorted | View::StuffToSort => filter::untagged(),
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            View::Actions => "Live Actions",
            View::Unsorted => "Inbox stuff",
            View::StuffToSort => "Stuff to sort",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Actions => "live",
            View::Unsorted => "unsorted",
            View::StuffToSort => "stuff_to_sort",
        }
    }
}

/// Query a view and resolve display titles, most recent store result first.
pub async fn fetch_view(store: &dyn TaskStore, view: View) -> Vec<TitleEntry> {
    match fetch_titles(store, &view.filter(Utc::now())).await {
        Ok(entries) => {
            info!("View {} returned {} entries", view.name(), entries.len());
            entries
        }
        Err(e) => {
            warn!("Failed to query view {}: {e}", view.name());
            Vec::new()
        }
    }
}

async fn fetch_titles(store: &dyn TaskStore, filter: &Filter) -> Result<Vec<TitleEntry>, Error> {
    let mut pages = store.query(filter).await?;
    pages.reverse();

    let lookups = pages.into_iter().map(|page| async move {
        let block = store.retrieve_block(&page.id).await?;
        Ok::<_, Error>(TitleEntry {
            url: page.url,
            title: block.into_title(),
        })
    });

    try_join_all(lookups).await
}

/// Create an immediate-horizon entry titled with `text`.
pub async fn add_entry(store: &dyn TaskStore, text: &str) -> Option<Page> {
    let page = NewPage {
        title: text.to_string(),
        horizon: HORIZON_IMMEDIATE.to_string(),
    };

    match store.create_page(&page).await {
        Ok(created) => {
            info!("Created entry {}", created.id);
            Some(created)
        }
        Err(e) => {
            warn!("Failed to create entry: {e}");
            None
        }
    }
}
