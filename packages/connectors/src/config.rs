use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::kernel::GatewayOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub nats: NatsConfig,
    pub deployment: DeploymentConfig,
    pub health_check_timeout: Duration,
    pub google_ads: Option<GatewayOptions>,
    pub meta: Option<GatewayOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct NatsConfig {
    pub url: String,
    /// Prepended to outbound subjects; empty means none
    pub subject_prefix: String,
    pub inbound_subject: String,
    pub queue_group: String,
    /// Approvals processed concurrently by one consumer
    pub max_in_flight: usize,
}

/// Retry and timeout policy for platform deploy calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Always at least 1
    pub max_retry_attempts: u32,
    /// Fixed wait between a failed attempt and the next one
    pub retry_delay: Duration,
    /// Deadline applied to each individual platform call
    pub per_attempt_timeout: Duration,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
            per_attempt_timeout: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_retry_attempts: u32 = parse_var(&lookup, "MAX_RETRY_ATTEMPTS", 3)?;
        if max_retry_attempts == 0 {
            bail!("MAX_RETRY_ATTEMPTS must be at least 1");
        }

        let max_in_flight: usize = parse_var(&lookup, "MAX_IN_FLIGHT", 16)?;
        if max_in_flight == 0 {
            bail!("MAX_IN_FLIGHT must be at least 1");
        }

        let log_format = match var("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        Ok(Self {
            port: parse_var(&lookup, "PORT", 8002)?,
            environment: var("ENVIRONMENT", "development"),
            log_level: var("LOG_LEVEL", "info"),
            log_format,
            nats: NatsConfig {
                url: var("NATS_URL", "nats://localhost:4222"),
                subject_prefix: var("NATS_SUBJECT_PREFIX", ""),
                inbound_subject: var("NATS_INBOUND_SUBJECT", "*.asset.status_changed"),
                queue_group: var("NATS_QUEUE_GROUP", "connectors"),
                max_in_flight,
            },
            deployment: DeploymentConfig {
                max_retry_attempts,
                retry_delay: Duration::from_secs(parse_var(&lookup, "RETRY_DELAY_SECONDS", 5)?),
                per_attempt_timeout: Duration::from_secs(parse_var(
                    &lookup,
                    "DEPLOYMENT_TIMEOUT_SECONDS",
                    300,
                )?),
            },
            health_check_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HEALTH_CHECK_TIMEOUT_SECONDS",
                10,
            )?),
            google_ads: gateway(&lookup, "GOOGLE_ADS_ENDPOINT", "GOOGLE_ADS_API_TOKEN"),
            meta: gateway(&lookup, "META_ENDPOINT", "META_ACCESS_TOKEN"),
        })
    }

    /// Returns true if running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Production requires at least one platform endpoint.
    pub fn check_platforms(&self) -> Result<()> {
        if self.is_production() && self.google_ads.is_none() && self.meta.is_none() {
            bail!("no platform endpoint configured (set GOOGLE_ADS_ENDPOINT or META_ENDPOINT)");
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

fn gateway<F>(lookup: &F, endpoint_key: &str, token_key: &str) -> Option<GatewayOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = lookup(endpoint_key).filter(|e| !e.trim().is_empty())?;
    Some(GatewayOptions {
        endpoint,
        token: lookup(token_key).filter(|t| !t.is_empty()),
    })
}
