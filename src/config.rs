use crate::risk::RiskSourceKind;

#[derive(Clone, Debug)]
pub struct Config {
    pub risk_source: RiskSourceKind,
    pub risk_api_url: String,
    pub risk_base_score: i32,
    pub risk_jitter_span: i32,
    pub risk_seed: Option<u64>,
    pub risk_latency_ms: u64,
    pub risk_timeout_ms: u64,
    pub risk_retries: u32,
    pub risk_retry_base_ms: u64,
    /// 0 disables the snapshot cache
    pub risk_cache_ttl_secs: u64,
    pub risk_fallback_mock: bool,
    /// Host refresh loop period; 0 fetches once
    pub risk_refresh_secs: u64,
    pub intro_enabled: bool,
    pub asset_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk_source: RiskSourceKind::Mock,
            risk_api_url: "http://localhost:8001/api/risk/analysis".to_string(),
            risk_base_score: 65,
            risk_jitter_span: 5,
            risk_seed: None,
            risk_latency_ms: 800,
            risk_timeout_ms: 5000,
            risk_retries: 2,
            risk_retry_base_ms: 200,
            risk_cache_ttl_secs: 0,
            risk_fallback_mock: false,
            risk_refresh_secs: 0,
            intro_enabled: true,
            asset_dir: "./public".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their default.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let num = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());
        let int = |key: &str| get(key).and_then(|v| v.trim().parse::<i32>().ok());
        let count = |key: &str| get(key).and_then(|v| v.trim().parse::<u32>().ok());
        let flag = |key: &str| get(key).map(|v| parse_flag(&v));

        Self {
            risk_source: get("RISK_SOURCE")
                .map(|v| RiskSourceKind::parse(&v))
                .unwrap_or(d.risk_source),
            risk_api_url: get("RISK_API_URL").unwrap_or(d.risk_api_url),
            risk_base_score: int("RISK_BASE_SCORE").unwrap_or(d.risk_base_score),
            risk_jitter_span: int("RISK_JITTER").unwrap_or(d.risk_jitter_span),
            risk_seed: num("RISK_SEED"),
            risk_latency_ms: num("RISK_LATENCY_MS").unwrap_or(d.risk_latency_ms),
            risk_timeout_ms: num("RISK_TIMEOUT_MS").unwrap_or(d.risk_timeout_ms),
            risk_retries: count("RISK_RETRIES").unwrap_or(d.risk_retries),
            risk_retry_base_ms: num("RISK_RETRY_BASE_MS").unwrap_or(d.risk_retry_base_ms),
            risk_cache_ttl_secs: num("RISK_CACHE_TTL_SECS").unwrap_or(d.risk_cache_ttl_secs),
            risk_fallback_mock: flag("RISK_FALLBACK_MOCK").unwrap_or(d.risk_fallback_mock),
            risk_refresh_secs: num("RISK_REFRESH_SECS").unwrap_or(d.risk_refresh_secs),
            intro_enabled: flag("INTRO").unwrap_or(d.intro_enabled),
            asset_dir: get("ASSET_DIR").unwrap_or(d.asset_dir),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
