//! Consumer-facing entry point for risk snapshots.
//!
//! Wraps a [`RiskDataSource`] with a per-attempt timeout, retry with backoff
//! for transient failures, an optional TTL cache, and caller-driven
//! cancellation. Calls are not coalesced: two concurrent callers trigger two
//! fetches and, without a cache, get independently jittered scores.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{RiskError, RiskResult};
use super::retry::{retry_async, RetryConfig};
use super::snapshot::RiskSnapshot;
use super::source::RiskDataSource;
use crate::config::Config;
use crate::logging::{log, log_snapshot, obj, v_str, Domain, Level};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RiskService {
    source: Arc<dyn RiskDataSource>,
    timeout: Duration,
    retry: RetryConfig,
    cache_ttl: Option<Duration>,
    cache: Mutex<Option<(Instant, RiskSnapshot)>>,
}

impl RiskService {
    pub fn new(source: Arc<dyn RiskDataSource>) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            cache_ttl: None,
            cache: Mutex::new(None),
        }
    }

    pub fn from_config(source: Arc<dyn RiskDataSource>, cfg: &Config) -> Self {
        let retry = RetryConfig {
            max_retries: cfg.risk_retries,
            base_delay_ms: cfg.risk_retry_base_ms,
            ..RetryConfig::default()
        };
        Self::new(source)
            .with_timeout(Duration::from_millis(cfg.risk_timeout_ms))
            .with_retry(retry)
            .with_cache_ttl(Duration::from_secs(cfg.risk_cache_ttl_secs))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Zero disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn get_risk_analysis(&self) -> RiskResult<RiskSnapshot> {
        if let Some(hit) = self.cached() {
            return Ok(hit);
        }

        let name = self.source.name();
        let snapshot = retry_async(&self.retry, name, || self.attempt()).await?;
        log_snapshot(name, &snapshot);
        self.store(&snapshot);
        Ok(snapshot)
    }

    /// Like [`get_risk_analysis`](Self::get_risk_analysis), but gives up with
    /// [`RiskError::Cancelled`] as soon as `token` fires.
    pub async fn get_risk_analysis_with_cancel(
        &self,
        token: &CancellationToken,
    ) -> RiskResult<RiskSnapshot> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                let data = obj(&[("source", v_str(self.source.name()))]);
                log(Level::Debug, Domain::Risk, "cancelled", data);
                Err(RiskError::Cancelled)
            }
            result = self.get_risk_analysis() => result,
        }
    }

    async fn attempt(&self) -> RiskResult<RiskSnapshot> {
        match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(RiskError::Timeout(self.timeout)),
        }
    }

    fn cached(&self) -> Option<RiskSnapshot> {
        let ttl = self.cache_ttl?;
        let guard = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some((at, snapshot)) if at.elapsed() < ttl => {
                let data = obj(&[("source", v_str(self.source.name()))]);
                log(Level::Debug, Domain::Risk, "cache_hit", data);
                Some(snapshot.clone())
            }
            _ => None,
        }
    }

    fn store(&self, snapshot: &RiskSnapshot) {
        if self.cache_ttl.is_none() {
            return;
        }
        let mut guard = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some((Instant::now(), snapshot.clone()));
    }
}
