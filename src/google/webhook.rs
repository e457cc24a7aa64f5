//! Apps Script webhook transport.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

/// One file as the Apps Script endpoint expects it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadPayload {
    /// Submitter name.
    pub name: String,
    /// Human-readable week label, not the week id.
    pub week: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64 of the (possibly compressed) file content.
    #[serde(rename = "fileData")]
    pub file_data: String,
}

/// Seam between the orchestrator and the network, so tests can record or
/// fail deliveries without a live endpoint.
#[async_trait]
pub trait Transmit: Send + Sync {
    async fn send(&self, payload: &UploadPayload) -> Result<()>;
}

/// Real transport that POSTs each payload to the configured web app URL.
pub struct WebhookTransport {
    http: Client,
    script_url: String,
}

impl WebhookTransport {
    pub fn new(http: Client, script_url: impl Into<String>) -> Self {
        Self {
            http,
            script_url: script_url.into(),
        }
    }
}

#[async_trait]
impl Transmit for WebhookTransport {
    /// Deliver one file to the Apps Script endpoint.
    ///
    /// The script is written against simple-request semantics: the body is
    /// JSON but must go out as `text/plain` so the browser-era endpoint skips
    /// CORS preflight. The response is never inspected; delivery counts as
    /// success whenever the request itself does not fail at the transport
    /// layer.
    async fn send(&self, payload: &UploadPayload) -> Result<()> {
        self.http
            .post(&self.script_url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(serde_json::to_string(payload)?)
            .send()
            .await?;
        Ok(())
    }
}
