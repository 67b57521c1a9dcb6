//! HTTP clients for running the ticket retrieval against separately deployed
//! validator and credential services.

use crate::error::KeygateError;
use crate::service::orchestrator::{CredentialSource, TicketValidator};
use crate::service::ticket::TicketVerdict;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Shared client; `timeout` bounds every upstream call end to end.
pub fn upstream_client(timeout: Duration) -> Result<reqwest::Client, KeygateError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[derive(Debug, Deserialize)]
struct ValidatorReply {
    status: Option<String>,
    #[serde(rename = "deviceId")]
    device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CredentialReply {
    value: String,
}

/// `POST {url}` with `{ "ticket_number": ... }`.
#[derive(Clone)]
pub struct HttpTicketValidator {
    client: reqwest::Client,
    url: String,
}

impl HttpTicketValidator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TicketValidator for HttpTicketValidator {
    async fn check(&self, ticket_number: &str) -> Result<TicketVerdict, KeygateError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "ticket_number": ticket_number }))
            .send()
            .await?;

        // The validator answers unknown and closed tickets with 404.
        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(TicketVerdict::Invalid),
            status if !status.is_success() => return Err(KeygateError::UpstreamStatus(status)),
            _ => {}
        }

        let reply: ValidatorReply = resp.json().await?;
        match (reply.status.as_deref(), reply.device_id) {
            (Some("valid"), Some(device_id)) if !device_id.is_empty() => {
                Ok(TicketVerdict::Valid { device_id })
            }
            (Some("valid"), _) => {
                warn!(ticket_number, "validator reported a valid ticket without a device");
                Ok(TicketVerdict::Invalid)
            }
            _ => Ok(TicketVerdict::Invalid),
        }
    }
}

/// `GET {url}?deviceId=..&credentialType=..`.
#[derive(Clone)]
pub struct HttpCredentialSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCredentialSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for HttpCredentialSource {
    async fn fetch(&self, device_id: &str, credential_type: &str) -> Result<String, KeygateError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("deviceId", device_id), ("credentialType", credential_type)])
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(KeygateError::NotFound),
            status if !status.is_success() => return Err(KeygateError::UpstreamStatus(status)),
            _ => {}
        }

        let reply: CredentialReply = resp.json().await?;
        Ok(reply.value)
    }
}
