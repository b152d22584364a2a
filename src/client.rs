//! Typed client for the `/flows` service.

use crate::editor::FlowSource;
use crate::flow::{Deleted, FlowEnvelope, FlowList, FlowRecord, FlowUpdate, NewFlow};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpFlowClient {
    base_url: String,
    http: Client,
}

impl HttpFlowClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self) -> Result<Vec<FlowRecord>> {
        let response = self
            .http
            .get(self.url("/flows"))
            .send()
            .await
            .context("Failed to list flows")?;

        let list: FlowList = decode(response).await?;
        Ok(list.flows)
    }

    pub async fn get(&self, id: &str) -> Result<FlowRecord> {
        let response = self
            .http
            .get(self.url(&format!("/flows/{id}")))
            .send()
            .await
            .with_context(|| format!("Failed to fetch flow {id}"))?;

        let envelope: FlowEnvelope = decode(response).await?;
        Ok(envelope.flow)
    }

    pub async fn create(&self, flow: &NewFlow) -> Result<FlowRecord> {
        let response = self
            .http
            .post(self.url("/flows"))
            .json(flow)
            .send()
            .await
            .context("Failed to create flow")?;

        let envelope: FlowEnvelope = decode(response).await?;
        Ok(envelope.flow)
    }

    pub async fn update(&self, id: &str, update: &FlowUpdate) -> Result<FlowRecord> {
        let response = self
            .http
            .put(self.url(&format!("/flows/{id}")))
            .json(update)
            .send()
            .await
            .with_context(|| format!("Failed to update flow {id}"))?;

        let envelope: FlowEnvelope = decode(response).await?;
        Ok(envelope.flow)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/flows/{id}")))
            .send()
            .await
            .with_context(|| format!("Failed to delete flow {id}"))?;

        let _: Deleted = decode(response).await?;
        Ok(())
    }
}

/// Parse a success body, or surface the service's `{error}` message
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        return Err(anyhow!("{message} ({status})"));
    }

    response
        .json()
        .await
        .context("Failed to decode flow service response")
}

#[async_trait]
impl FlowSource for HttpFlowClient {
    async fn fetch_flow(&self, id: &str) -> Result<FlowRecord> {
        self.get(id).await
    }
}
