// SPDX-License-Identifier: Apache-2.0

//! Store adapters that speak JSON over HTTP to a record service.
//!
//! Wire contract shared by both sides:
//! `GET {base}/records/{id}` answers 200 with the record or 404 on a miss,
//! `GET {base}/count` answers `{"count": n}`.
//! The new store mints ids on `POST {base}/records`; the legacy store is
//! written with `PUT {base}/records/{id}`.

use super::{LegacyCustomerStore, NewCustomerStore, StoreError};
use crate::config::{RemoteStoreConfig, RetryPolicy};
use async_trait::async_trait;
use bijux_bridge_model::{Customer, CustomerDraft, CustomerId, LegacyCustomer};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct CountBody {
    count: u64,
}

pub struct RemoteStoreClient {
    base_url: String,
    client: Client,
    headers: HeaderMap,
    retry: RetryPolicy,
}

fn transport_error(op: &str, e: &reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::timeout(format!("{op}: {e}"))
    } else {
        StoreError::unavailable(format!("{op}: {e}"))
    }
}

fn status_error(op: &str, status: StatusCode) -> StoreError {
    if status.is_server_error() {
        StoreError::unavailable(format!("{op}: upstream status {status}"))
    } else {
        StoreError::rejected(format!("{op}: upstream status {status}"))
    }
}

impl RemoteStoreClient {
    pub fn new(base_url: &str, cfg: &RemoteStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| StoreError::unavailable(format!("http client build failed: {e}")))?;
        let mut headers = HeaderMap::new();
        if let Some(token) = &cfg.auth_bearer {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StoreError::rejected(format!("invalid auth header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            headers,
            retry: cfg.retry.clone(),
        })
    }

    fn record_url(&self, id: &CustomerId) -> String {
        format!("{}/records/{}", self.base_url, id.as_str())
    }

    /// Sends until a non-5xx response arrives. Non-idempotent calls get a
    /// single attempt regardless of the policy.
    #[instrument(name = "store_remote_send", skip(self, build), fields(base = %self.base_url))]
    async fn send<F>(&self, op: &'static str, idempotent: bool, build: F) -> Result<Response, StoreError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let max_attempts = if idempotent {
            self.retry.max_attempts.max(1)
        } else {
            1
        };
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match build(&self.client).headers(self.headers.clone()).send().await {
                Ok(resp) if !resp.status().is_server_error() => return Ok(resp),
                Ok(resp) => status_error(op, resp.status()),
                Err(e) => transport_error(op, &e),
            };
            if attempt >= max_attempts {
                return Err(err);
            }
            tracing::debug!(op, attempt, error = %err, "retrying remote store call");
            tokio::time::sleep(Duration::from_millis(
                self.retry.base_backoff_ms.saturating_mul(attempt as u64),
            ))
            .await;
        }
    }

    async fn decode<T: DeserializeOwned>(op: &str, resp: Response) -> Result<T, StoreError> {
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::corrupt(format!("{op}: undecodable body: {e}")))
    }

    async fn get_record<T: DeserializeOwned>(
        &self,
        op: &'static str,
        id: &CustomerId,
    ) -> Result<Option<T>, StoreError> {
        let url = self.record_url(id);
        let resp = self.send(op, true, |c| c.get(&url)).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Self::decode(op, resp).await.map(Some),
            s => Err(status_error(op, s)),
        }
    }

    async fn count(&self, op: &'static str) -> Result<u64, StoreError> {
        let url = format!("{}/count", self.base_url);
        let resp = self.send(op, true, |c| c.get(&url)).await?;
        if !resp.status().is_success() {
            return Err(status_error(op, resp.status()));
        }
        Ok(Self::decode::<CountBody>(op, resp).await?.count)
    }
}

pub struct HttpNewStore {
    client: RemoteStoreClient,
}

impl HttpNewStore {
    #[must_use]
    pub fn new(client: RemoteStoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewCustomerStore for HttpNewStore {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        let found: Option<Customer> = self.client.get_record("new store get", id).await?;
        match found {
            Some(c) if &c.id != id => Err(StoreError::corrupt(format!(
                "new store get: asked for {id}, got {}",
                c.id
            ))),
            other => Ok(other),
        }
    }

    async fn put(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
        let op = "new store put";
        let url = format!("{}/records", self.client.base_url);
        let resp = self
            .client
            .send(op, false, |c| c.post(&url).json(&draft))
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(op, resp.status()));
        }
        RemoteStoreClient::decode(op, resp).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.client.count("new store count").await
    }
}

pub struct HttpLegacyStore {
    client: RemoteStoreClient,
}

impl HttpLegacyStore {
    #[must_use]
    pub fn new(client: RemoteStoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LegacyCustomerStore for HttpLegacyStore {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<LegacyCustomer>, StoreError> {
        let found: Option<LegacyCustomer> = self.client.get_record("legacy store get", id).await?;
        match found {
            Some(r) if &r.customer_id != id => Err(StoreError::corrupt(format!(
                "legacy store get: asked for {id}, got {}",
                r.customer_id
            ))),
            other => Ok(other),
        }
    }

    // PUT under a fixed id is idempotent, so it shares the retry policy.
    async fn put(&self, record: LegacyCustomer) -> Result<(), StoreError> {
        let op = "legacy store put";
        let url = self.client.record_url(&record.customer_id);
        let resp = self
            .client
            .send(op, true, |c| c.put(&url).json(&record))
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(op, resp.status()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.client.count("legacy store count").await
    }
}
