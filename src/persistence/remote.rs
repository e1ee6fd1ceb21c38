use crate::error::StoreError;
use crate::utils::http_client::build_upstream_client;
use crate::utils::text::truncate_with_ellipsis;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Asynchronous row store holding one state document per application id.
///
/// Writes are unconditional upserts: the last writer wins, across devices
/// too. There is no version check.
pub trait RemoteStore: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when no row exists or the stored state is null.
    fn fetch<'a>(&'a self, app_id: &'a str) -> StoreFuture<'a, Option<Value>>;

    fn upsert<'a>(&'a self, app_id: &'a str, state: &'a Value) -> StoreFuture<'a, ()>;
}

#[derive(Debug, Deserialize)]
struct StateRow {
    #[serde(default)]
    state: Value,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    app_id: &'a str,
    state: &'a Value,
    updated_at: String,
}

/// Supabase / PostgREST table backend.
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            client: build_upstream_client(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_row(&self, app_id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[
                ("select", "state".to_string()),
                ("app_id", format!("eq.{app_id}")),
                ("limit", "1".to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let rows: Vec<StateRow> = response.json().await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.state)
            .filter(|state| !state.is_null()))
    }

    async fn upsert_row(&self, app_id: &str, state: &Value) -> Result<(), StoreError> {
        let row = UpsertRow {
            app_id,
            state,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        let response = self
            .authorized(self.client.post(self.table_url()))
            .query(&[("on_conflict", "app_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl RemoteStore for PostgrestStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    fn fetch<'a>(&'a self, app_id: &'a str) -> StoreFuture<'a, Option<Value>> {
        Box::pin(self.fetch_row(app_id))
    }

    fn upsert<'a>(&'a self, app_id: &'a str, state: &'a Value) -> StoreFuture<'a, ()> {
        Box::pin(self.upsert_row(app_id, state))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::RemoteStatus {
        status: status.as_u16(),
        message: truncate_with_ellipsis(&body, MAX_ERROR_BODY_CHARS),
    })
}

/// Stand-in when no remote is configured: every call fails, so reads fall
/// back to the local store and writes stay local.
pub struct UnconfiguredStore;

impl RemoteStore for UnconfiguredStore {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn fetch<'a>(&'a self, _app_id: &'a str) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async { Err(StoreError::NotConfigured) })
    }

    fn upsert<'a>(&'a self, _app_id: &'a str, _state: &'a Value) -> StoreFuture<'a, ()> {
        Box::pin(async { Err(StoreError::NotConfigured) })
    }
}
