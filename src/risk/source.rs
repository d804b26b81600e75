use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::error::RiskResult;
use super::http::HttpRiskSource;
use super::mock::MockRiskSource;
use super::snapshot::RiskSnapshot;
use crate::config::Config;
use crate::logging::{log, obj, v_str, Domain, Level};

/// Anything that can produce a [`RiskSnapshot`]. Consumers only see this trait,
/// so the mock can be swapped for a network-backed source.
#[async_trait]
pub trait RiskDataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> RiskResult<RiskSnapshot>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskSourceKind {
    Mock,
    Http,
}

impl RiskSourceKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => RiskSourceKind::Http,
            _ => RiskSourceKind::Mock,
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Arc<dyn RiskDataSource>> {
        match self {
            RiskSourceKind::Mock => Ok(Arc::new(MockRiskSource::from_config(cfg))),
            RiskSourceKind::Http => {
                let http = HttpRiskSource::from_config(cfg)?;
                if cfg.risk_fallback_mock {
                    Ok(Arc::new(FallbackSource::new(
                        Arc::new(http),
                        Arc::new(MockRiskSource::from_config(cfg)),
                    )))
                } else {
                    Ok(Arc::new(http))
                }
            }
        }
    }
}

/// Serves `fallback` whenever `primary` fails.
pub struct FallbackSource {
    primary: Arc<dyn RiskDataSource>,
    fallback: Arc<dyn RiskDataSource>,
    name: String,
}

impl FallbackSource {
    pub fn new(primary: Arc<dyn RiskDataSource>, fallback: Arc<dyn RiskDataSource>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self { primary, fallback, name }
    }
}

#[async_trait]
impl RiskDataSource for FallbackSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> RiskResult<RiskSnapshot> {
        match self.primary.fetch().await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Source,
                    "fallback",
                    obj(&[
                        ("primary", v_str(self.primary.name())),
                        ("fallback", v_str(self.fallback.name())),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
                self.fallback.fetch().await
            }
        }
    }
}
