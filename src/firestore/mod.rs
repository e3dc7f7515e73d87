//! Firestore REST client implementing the remote store traits.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`ScheduleStore::get_schedule`] | `GET  {root}/documents/{schedules}/{key}` |
//! | [`HistoryLog::append`] | `PATCH {root}/documents/{history}/{timestamp}_{term}` |
//! | [`HistoryLog::recent`] | `POST {root}/documents:runQuery` |
//!
//! where `{root}` is `{base_url}/projects/{project_id}/databases/{database}`.
//!
//! A `404` on the point read means "no schedule" and maps to `Ok(None)`.
//! Every other non-success status, and every transport error, is returned
//! as `Err`. There is no automatic retry: the caller surfaces the failure.
//!
//! When an API key is configured it is sent as the `key` query parameter.

pub mod value;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use shift_lookup_core::models::{DeviceId, HistoryEntry, ScheduleRecord};
use shift_lookup_core::store::{HistoryLog, ScheduleStore};
use std::time::Duration;

use crate::config::RemoteConfig;

pub struct FirestoreClient {
    client: reqwest::Client,
    /// `{base_url}/projects/{project}/databases/{database}`
    root: Url,
    api_key: Option<String>,
    schedules_collection: String,
    history_collection: String,
}

impl FirestoreClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut root = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid remote.base_url: {}", config.base_url))?;
        root.path_segments_mut()
            .map_err(|_| anyhow!("remote.base_url cannot be used as a base: {}", config.base_url))?
            .pop_if_empty()
            .extend([
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database.as_str(),
            ]);

        Ok(Self {
            client,
            root,
            api_key: config.api_key.clone(),
            schedules_collection: config.schedules_collection.clone(),
            history_collection: config.history_collection.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        if id.is_empty() || id.contains('/') {
            bail!("invalid document id '{}'", id);
        }
        Ok(self.url(&["documents", collection, id]))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.query(&[("key", key)]),
            None => req,
        }
    }
}

async fn error_for(response: reqwest::Response, what: &str) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow!("Firestore {} failed with {}: {}", what, status, body)
}

#[async_trait]
impl ScheduleStore for FirestoreClient {
    async fn get_schedule(&self, key: &str) -> Result<Option<ScheduleRecord>> {
        let url = self.document_url(&self.schedules_collection, key)?;
        tracing::debug!(%url, "schedule lookup");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .context("schedule lookup request failed")?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let doc: Value = response.json().await?;
                Ok(Some(value::from_document(&doc)?))
            }
            _ => Err(error_for(response, "schedule lookup").await),
        }
    }
}

#[async_trait]
impl HistoryLog for FirestoreClient {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let url = self.document_url(&self.history_collection, &entry.document_id())?;
        let body = value::to_document(entry)?;
        tracing::debug!(%url, "history append");

        let response = self
            .authorize(self.client.patch(url))
            .json(&body)
            .send()
            .await
            .context("history append request failed")?;

        if !response.status().is_success() {
            return Err(error_for(response, "history append").await);
        }
        Ok(())
    }

    async fn recent(&self, device: &DeviceId, limit: usize) -> Result<Vec<HistoryEntry>> {
        let url = self.url(&["documents:runQuery"]);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.history_collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "deviceId" },
                        "op": "EQUAL",
                        "value": { "stringValue": device.as_str() }
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": "timestamp" },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        });
        tracing::debug!(%url, %device, limit, "history query");

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await
            .context("history query request failed")?;

        if !response.status().is_success() {
            return Err(error_for(response, "history query").await);
        }

        let rows: Vec<Value> = response.json().await?;
        Ok(parse_query_rows(&rows))
    }
}

/// Extract entries from a `runQuery` response.
///
/// Rows without a `document` (progress or read-time markers) are ignored,
/// as are documents that do not decode as a [`HistoryEntry`].
fn parse_query_rows(rows: &[Value]) -> Vec<HistoryEntry> {
    rows.iter()
        .filter_map(|row| row.get("document"))
        .filter_map(|doc| match value::from_document::<HistoryEntry>(doc) {
            Ok(entry) => Some(entry),
            Err(e) => {
                let name = doc.get("name").and_then(Value::as_str).unwrap_or("?");
                tracing::warn!(name, "skipping malformed history document: {:#}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> FirestoreClient {
        let mut cfg = Config::minimal().remote;
        cfg.project_id = "tra-lich-lam".to_string();
        FirestoreClient::new(&cfg).unwrap()
    }

    #[test]
    fn test_document_url_layout() {
        let url = client().document_url("schedules", "123456789").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/tra-lich-lam/databases/(default)/documents/schedules/123456789"
        );
    }

    #[test]
    fn test_run_query_url() {
        let url = client().url(&["documents:runQuery"]);
        assert!(url
            .as_str()
            .ends_with("/databases/(default)/documents:runQuery"));
    }

    #[test]
    fn test_document_id_cannot_escape_collection() {
        assert!(client().document_url("schedules", "../x/y").is_err());
        assert!(client().document_url("schedules", "").is_err());
    }

    #[test]
    fn test_parse_query_rows_skips_markers_and_garbage() {
        let rows = vec![
            json!({ "readTime": "2026-10-16T00:00:00Z" }),
            json!({ "document": { "name": "a", "fields": {
                "id": { "stringValue": "2" },
                "term": { "stringValue": "123456789" },
                "timestamp": { "integerValue": "2" },
                "resultCount": { "integerValue": "0" },
                "savedResults": { "arrayValue": {} },
                "deviceId": { "stringValue": "dev_1" }
            } } }),
            json!({ "document": { "name": "b", "fields": {
                "term": { "stringValue": "missing everything else" }
            } } }),
        ];
        let entries = parse_query_rows(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].term, "123456789");
        assert_eq!(entries[0].device_id, Some(DeviceId::new("dev_1")));
    }
}
