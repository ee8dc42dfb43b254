//! Notion REST client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{ApiErrorBody, Block, NewPage, Page, QueryResponse};
use super::{Error, Filter, TaskStore};

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    secret: String,
    database_id: String,
    base_url: String,
    http: reqwest::Client,
}

impl NotionClient {
    pub fn new(secret: String, database_id: String) -> Self {
        Self::with_base_url(secret, database_id, NOTION_API_URL)
    }

    pub fn with_base_url(secret: String, database_id: String, base_url: &str) -> Self {
        Self {
            secret,
            database_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let response = request
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("failed to read response: {e}")))?;

        debug!("Notion response status: {status}");

        if !status.is_success() {
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or(ApiErrorBody {
                code: String::new(),
                message: body,
            });
            return Err(Error::Api {
                status: status.as_u16(),
                code: parsed.code,
                message: parsed.message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");
        self.send(self.http.post(&url).json(body)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");
        self.send(self.http.get(&url)).await
    }
}

#[async_trait]
impl TaskStore for NotionClient {
    async fn query(&self, filter: &Filter) -> Result<Vec<Page>, Error> {
        let path = format!("/databases/{}/query", self.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({ "filter": filter.to_json() });
            if let Some(ref c) = cursor {
                body["start_cursor"] = Value::String(c.clone());
            }

            let response: QueryResponse = self.post(&path, &body).await?;
            pages.extend(response.results);

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        debug!("Query matched {} page(s)", pages.len());
        Ok(pages)
    }

    async fn retrieve_block(&self, block_id: &str) -> Result<Block, Error> {
        self.get(&format!("/blocks/{block_id}")).await
    }

    async fn create_page(&self, page: &NewPage) -> Result<Page, Error> {
        self.post("/pages", &page.to_json(&self.database_id)).await
    }
}
