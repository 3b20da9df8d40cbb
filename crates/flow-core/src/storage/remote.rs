//! Remote document store client
//!
//! Authenticated-scope persistence: one JSON document per entry plus one
//! settings document per user, served by the sync API. The client covers
//! get, upsert, delete, and list-all-for-user, and carries the current
//! session's bearer token.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::{AppSettings, EntryId, NoteEntry};
use crate::util::{compact_text, is_http_url};

/// HTTP client for the per-user remote document store.
pub struct RemoteStore {
    base_url: String,
    client: Client,
    access_token: RwLock<Option<String>>,
}

impl RemoteStore {
    /// Create a client for the given API base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/').to_string();
        if !is_http_url(&base_url) {
            return Err(Error::InvalidInput(
                "sync URL must include http:// or https://".into(),
            ));
        }

        Ok(Self {
            base_url,
            client: Client::builder().build()?,
            access_token: RwLock::new(None),
        })
    }

    /// Install (or clear) the bearer token for subsequent requests.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn entry_url(&self, uid: &str, id: &EntryId) -> String {
        format!("{}/users/{uid}/entries/{id}", self.base_url)
    }

    /// Fetch all entries for a user, newest-created-first.
    pub async fn list_entries(&self, uid: &str) -> Result<Vec<NoteEntry>> {
        let request = self
            .authorized(self.client.get(format!("{}/users/{uid}/entries", self.base_url)))
            .await;
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let mut entries = response.json::<Vec<NoteEntry>>().await?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Upsert one entry document.
    pub async fn put_entry(&self, uid: &str, entry: &NoteEntry) -> Result<()> {
        let request = self
            .authorized(self.client.put(self.entry_url(uid, &entry.id)).json(entry))
            .await;
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Delete one entry document. Deleting an absent document is not an error.
    pub async fn delete_entry(&self, uid: &str, id: &EntryId) -> Result<()> {
        let request = self.authorized(self.client.delete(self.entry_url(uid, id))).await;
        let response = request.send().await?;
        if !(response.status().is_success() || response.status() == StatusCode::NOT_FOUND) {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Fetch the user's settings document, if one exists.
    pub async fn get_settings(&self, uid: &str) -> Result<Option<AppSettings>> {
        let request = self
            .authorized(self.client.get(format!("{}/users/{uid}/settings", self.base_url)))
            .await;
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(Some(response.json::<AppSettings>().await?))
    }

    /// Upsert the user's settings document.
    pub async fn put_settings(&self, uid: &str, settings: &AppSettings) -> Result<()> {
        let request = self
            .authorized(
                self.client
                    .put(format!("{}/users/{uid}/settings", self.base_url))
                    .json(settings),
            )
            .await;
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Error::Api(parse_api_error(status, &body))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}
