//! Document-store checkpoint backend.
//!
//! Persists checkpoints as `{"_key": …, "state": …}` documents in a named
//! collection of the host's key-value store, addressed through the
//! management API under the app namespace with the "any owner" sentinel.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{CheckpointError, Checkpointer};

/// Owner scope meaning "not owned by a particular user".
pub const OWNER_ANY: &str = "nobody";

/// Errors raised by the document-store backend.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum KvStoreError {
    /// The HTTP request could not be completed.
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an unexpected status (including a missing
    /// document on delete).
    #[error("unexpected status {status} for {url}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The request URL.
        url: String,
    },
}

/// Stored document shape.
#[derive(Serialize, Deserialize)]
struct Record {
    #[serde(rename = "_key")]
    key: String,
    state: Value,
}

/// Checkpoint backend persisting into the host's key-value store.
pub struct KvStoreCheckpointer {
    client: reqwest::Client,
    collection_url: String,
    session_key: String,
}

impl KvStoreCheckpointer {
    /// Creates a backend bound to `collection` in `app`'s namespace on the
    /// management endpoint `scheme://host:port`.
    pub fn new(
        collection: impl Into<String>,
        session_key: impl Into<String>,
        app: &str,
        scheme: &str,
        host: &str,
        port: u16,
    ) -> Result<Self, CheckpointError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(KvStoreError::from)?;
        let collection = collection.into();
        let collection_url = format!(
            "{scheme}://{host}:{port}/servicesNS/{OWNER_ANY}/{app}/storage/collections/data/{collection}"
        );
        Ok(Self {
            client,
            collection_url,
            session_key: session_key.into(),
        })
    }

    fn key_url(&self, key: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        format!("{}/{}", self.collection_url, encoded)
    }

    fn auth_value(&self) -> String {
        format!("Bearer {}", self.session_key)
    }

    async fn post_record(&self, url: &str, record: &Record) -> Result<StatusCode, KvStoreError> {
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.auth_value())
            .json(record)
            .send()
            .await?;
        Ok(resp.status())
    }
}

#[async_trait]
impl Checkpointer for KvStoreCheckpointer {
    fn name(&self) -> &'static str {
        "kvstore"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CheckpointError> {
        let url = self.key_url(key);
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth_value())
            .send()
            .await
            .map_err(KvStoreError::from)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record: Record = resp.json().await.map_err(KvStoreError::from)?;
                Ok(Some(record.state))
            }
            status => Err(KvStoreError::Status { status, url }.into()),
        }
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), CheckpointError> {
        let record = Record {
            key: key.to_string(),
            state: value,
        };

        // Update in place; a store that has never seen the key answers 404,
        // in which case the document is inserted into the collection.
        let update_url = self.key_url(key);
        let status = self.post_record(&update_url, &record).await?;
        if status.is_success() {
            return Ok(());
        }
        if status != StatusCode::NOT_FOUND {
            return Err(KvStoreError::Status {
                status,
                url: update_url,
            }
            .into());
        }

        let status = self.post_record(&self.collection_url, &record).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(KvStoreError::Status {
                status,
                url: self.collection_url.clone(),
            }
            .into())
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CheckpointError> {
        let url = self.key_url(key);
        let resp = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, self.auth_value())
            .send()
            .await
            .map_err(KvStoreError::from)?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(KvStoreError::Status { status, url }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpointer() -> KvStoreCheckpointer {
        KvStoreCheckpointer::new("progress", "tok", "ta_demo", "https", "127.0.0.1", 8089)
            .unwrap()
    }

    #[test]
    fn collection_url_carries_namespace_and_owner() {
        let store = checkpointer();
        assert_eq!(
            store.collection_url,
            "https://127.0.0.1:8089/servicesNS/nobody/ta_demo/storage/collections/data/progress"
        );
    }

    #[test]
    fn keys_are_percent_encoded_in_urls() {
        let store = checkpointer();
        assert_eq!(
            store.key_url("demo://alpha beta"),
            format!("{}/demo%3A%2F%2Falpha+beta", store.collection_url)
        );
    }
}
