//! Client for a REST risk-analysis endpoint returning the `RiskSnapshot` JSON.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::error::{RiskError, RiskResult};
use super::snapshot::RiskSnapshot;
use super::source::RiskDataSource;
use crate::config::Config;

pub struct HttpRiskSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpRiskSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.risk_api_url.clone(), Duration::from_millis(cfg.risk_timeout_ms))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_transport(&self, err: reqwest::Error) -> RiskError {
        if err.is_timeout() {
            RiskError::Timeout(self.timeout)
        } else if err.is_decode() {
            RiskError::InvalidResponse(err.to_string())
        } else {
            RiskError::Unavailable(err.to_string())
        }
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub fn status_error(status: StatusCode, timeout: Duration) -> RiskError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => RiskError::Timeout(timeout),
        other => RiskError::Unavailable(format!("upstream returned {}", other)),
    }
}

/// Decode and validate a response body.
pub fn decode_snapshot(body: &str) -> RiskResult<RiskSnapshot> {
    let snapshot: RiskSnapshot = serde_json::from_str(body)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[async_trait]
impl RiskDataSource for HttpRiskSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> RiskResult<RiskSnapshot> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, self.timeout));
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        decode_snapshot(&body)
    }
}
