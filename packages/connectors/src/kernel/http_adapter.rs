//! HTTP platform adapter.
//!
//! Talks to a per-platform deployment gateway that owns the platform's auth
//! and request shaping. The gateway contract is small:
//!
//! - `POST {endpoint}/deployments` with a [`DeploymentRequest`] body, answering
//!   `{ "platform_id": "...", "platform_url": "..." }` on success
//! - `GET {endpoint}/health` answering any 2xx when the platform is reachable

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::BasePlatformAdapter;
use crate::domains::deployment::models::{DeploymentRequest, Platform, PlatformReceipt};

/// Connection settings for one platform gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub endpoint: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayDeployResponse {
    platform_id: String,
    #[serde(default)]
    platform_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpPlatformAdapter {
    platform: Platform,
    options: GatewayOptions,
    client: Client,
}

impl HttpPlatformAdapter {
    pub fn new(platform: Platform, options: GatewayOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("connectors/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            platform,
            options: GatewayOptions {
                endpoint: options.endpoint.trim_end_matches('/').to_string(),
                token: options.token,
            },
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.options.endpoint, path)
    }
}

#[async_trait]
impl BasePlatformAdapter for HttpPlatformAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<PlatformReceipt> {
        let body = serde_json::to_vec(request).context("Failed to encode deployment request")?;
        let data_sent = body.len() as u64;

        let mut builder = self
            .client
            .post(self.url("deployments"))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.options.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Request to {} gateway failed", self.platform))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read {} gateway response", self.platform))?;

        if !status.is_success() {
            bail!(
                "{} gateway returned {}: {}",
                self.platform,
                status,
                String::from_utf8_lossy(&bytes)
            );
        }

        let parsed: GatewayDeployResponse = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {} gateway response", self.platform))?;

        debug!(
            platform = %self.platform,
            platform_id = %parsed.platform_id,
            "gateway accepted deployment"
        );

        Ok(PlatformReceipt {
            platform_id: parsed.platform_id,
            platform_url: parsed.platform_url,
            data_sent,
            data_received: bytes.len() as u64,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let mut builder = self.client.get(self.url("health"));
        if let Some(token) = &self.options.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Request to {} gateway failed", self.platform))?;

        if !response.status().is_success() {
            bail!("{} gateway returned {}", self.platform, response.status());
        }
        Ok(())
    }
}
