//! Synthetic risk source: fixed fixture payload plus a jittered score.

use async_trait::async_trait;
use chrono::{Local, Timelike};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;

use super::error::RiskResult;
use super::jitter::{compose_score, Jitter, SeededJitter, UniformJitter};
use super::snapshot::{
    AssetExtremes, AssetTilt, ExpectedMove, Impact, MacroEvent, NextEvent, RiskCategory, RiskReason,
    RiskSnapshot, TiltColor, VolatilityRegime, VolatilityReport,
};
use super::source::RiskDataSource;
use crate::config::Config;

pub const DEFAULT_BASE_SCORE: i32 = 65;
pub const DEFAULT_JITTER_SPAN: i32 = 5;
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(800);

/// Stand-in for the risk API. Only the score, what derives from it, and
/// `last_update` change between calls.
pub struct MockRiskSource {
    base_score: i32,
    latency: Duration,
    jitter: Arc<dyn Jitter>,
}

impl MockRiskSource {
    pub fn new(jitter: Arc<dyn Jitter>) -> Self {
        Self {
            base_score: DEFAULT_BASE_SCORE,
            latency: DEFAULT_LATENCY,
            jitter,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let jitter: Arc<dyn Jitter> = match cfg.risk_seed {
            Some(seed) => Arc::new(SeededJitter::new(cfg.risk_jitter_span, seed)),
            None => Arc::new(UniformJitter::new(cfg.risk_jitter_span)),
        };
        Self::new(jitter)
            .with_base_score(cfg.risk_base_score)
            .with_latency(Duration::from_millis(cfg.risk_latency_ms))
    }

    pub fn with_base_score(mut self, base_score: i32) -> Self {
        self.base_score = base_score;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build a snapshot immediately, stamped with the local time.
    pub fn generate(&self) -> RiskSnapshot {
        self.generate_at(&Local::now())
    }

    pub fn generate_at<T: Timelike>(&self, now: &T) -> RiskSnapshot {
        let risk_score = compose_score(self.base_score, self.jitter.sample());
        fixture(risk_score, format_last_update(now))
    }
}

#[async_trait]
impl RiskDataSource for MockRiskSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> RiskResult<RiskSnapshot> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.generate())
    }
}

/// 24-hour `HH:MM`.
pub fn format_last_update<T: Timelike>(now: &T) -> String {
    format!("{:02}:{:02}", now.hour(), now.minute())
}

fn reason(name: &str, description: &str, weight: f64) -> RiskReason {
    RiskReason {
        name: name.to_string(),
        description: description.to_string(),
        weight,
    }
}

fn extremes(
    current: f64,
    weekly_high: f64,
    weekly_low: f64,
    distance: f64,
    nearest: &str,
) -> AssetExtremes {
    AssetExtremes {
        current,
        weekly_high,
        weekly_low,
        distance_to_extreme_pct: distance,
        nearest_extreme: nearest.to_string(),
    }
}

fn tilt(tilt: &str, color: TiltColor, note: &str) -> AssetTilt {
    AssetTilt {
        tilt: tilt.to_string(),
        color,
        note: note.to_string(),
    }
}

fn fixture(risk_score: u8, last_update: String) -> RiskSnapshot {
    let components = IndexMap::from([
        ("vix_level".to_string(), 18.0),
        ("vix_momentum".to_string(), 12.0),
        ("event_risk".to_string(), 8.0),
        ("market_stretch".to_string(), 22.0),
    ]);

    let assets = IndexMap::from([
        ("EURUSD".to_string(), extremes(1.0850, 1.0900, 1.0800, 0.8, "Weekly Low")),
        ("BTCUSD".to_string(), extremes(43500.0, 44200.0, 42000.0, 1.2, "Weekly High")),
        ("SPX".to_string(), extremes(4950.0, 5000.0, 4900.0, 0.4, "ATH")),
    ]);

    let asset_tilts = IndexMap::from([
        ("EURUSD".to_string(), tilt("bullish", TiltColor::Green, "Holding support")),
        ("BTCUSD".to_string(), tilt("neutral-bearish", TiltColor::Yellow, "Consolidation")),
        ("SPX".to_string(), tilt("overextended", TiltColor::Red, "RSI Divergence")),
    ]);

    RiskSnapshot {
        risk_score,
        risk_category: RiskCategory::from_score(risk_score),
        last_update,
        reasons: vec![
            reason("VIX Momentum", "Rising volatility", 18.0),
            reason("Put/Call Ratio", "Bearish sentiment", 20.0),
            reason("Market Breadth", "Divergence", 15.0),
        ],
        components,
        volatility: VolatilityReport {
            current: 21.45,
            change: 1.25,
            regime: VolatilityRegime::from_score(risk_score),
            yesterday: 20.20,
            high_5d: 22.10,
            low_5d: 18.50,
            source: "simulation".to_string(),
        },
        expected_move: ExpectedMove {
            percent: 0.85,
            index_points: 42.0,
        },
        next_event: NextEvent {
            name: "FOMC Minutes".to_string(),
            hours_away: 4.0,
        },
        macro_events: vec![
            MacroEvent {
                time: "14:30".to_string(),
                name: "CPI Data".to_string(),
                consensus: "0.3%".to_string(),
                previous: "0.4%".to_string(),
                impact: Impact::High,
            },
            MacroEvent {
                time: "16:00".to_string(),
                name: "Consumer Confidence".to_string(),
                consensus: "102.0".to_string(),
                previous: "101.3".to_string(),
                impact: Impact::Medium,
            },
        ],
        assets,
        asset_tilts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::jitter::FixedJitter;
    use chrono::NaiveTime;

    fn fixed(offset: i32) -> MockRiskSource {
        MockRiskSource::new(Arc::new(FixedJitter(offset))).with_latency(Duration::ZERO)
    }

    #[test]
    fn zero_jitter_is_base_medium() {
        let snap = fixed(0).generate();
        assert_eq!(snap.risk_score, 65);
        assert_eq!(snap.risk_category, RiskCategory::Medium);
        assert_eq!(snap.volatility.regime, VolatilityRegime::Neutral);
    }

    #[test]
    fn high_jitter_crosses_into_high() {
        let snap = fixed(11).generate();
        assert_eq!(snap.risk_score, 76);
        assert_eq!(snap.risk_category, RiskCategory::High);
        assert_eq!(snap.volatility.regime, VolatilityRegime::RiskOff);

        let snap = fixed(15).generate();
        assert_eq!(snap.risk_score, 80);
        assert_eq!(snap.risk_category, RiskCategory::High);
    }

    #[test]
    fn extreme_base_is_clamped() {
        let hot = fixed(5).with_base_score(99).generate();
        assert_eq!(hot.risk_score, 100);
        let cold = fixed(-5).with_base_score(3).generate();
        assert_eq!((cold.risk_score, cold.risk_category), (0, RiskCategory::Safe));
    }

    #[test]
    fn fixture_fields_do_not_depend_on_score() {
        let a = fixed(-5).generate_at(&NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        let b = fixed(5).generate_at(&NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(a.reasons, b.reasons);
        assert_eq!(a.components, b.components);
        assert_eq!(a.macro_events, b.macro_events);
        assert_eq!(a.assets, b.assets);
        assert_eq!(a.asset_tilts, b.asset_tilts);
        assert_eq!(a.volatility.current, 21.45);
        assert_eq!(a.volatility.source, "simulation");
        assert_eq!(a.next_event.name, "FOMC Minutes");
        assert_eq!(a.reasons[1].weight, 20.0);
    }

    #[test]
    fn last_update_is_zero_padded_24h() {
        assert_eq!(format_last_update(&NaiveTime::from_hms_opt(9, 5, 59).unwrap()), "09:05");
        assert_eq!(format_last_update(&NaiveTime::from_hms_opt(21, 30, 0).unwrap()), "21:30");
    }

    #[test]
    fn payload_matches_dashboard_schema() {
        let snap = fixed(0).generate_at(&NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["risk_category"], "MEDIUM");
        assert_eq!(json["vix"]["regime"], "neutral");
        assert_eq!(json["expected_move"]["sp500_points"], 42.0);
        assert_eq!(json["next_event"]["event"], "FOMC Minutes");
        assert_eq!(json["reasons"][0]["desc"], "Rising volatility");
        assert_eq!(json["assets"]["SPX"]["distance_to_extreme"], 0.4);
        assert_eq!(json["asset_tilts"]["BTCUSD"]["text"], "Consolidation");
        assert_eq!(json["macro_events"][0]["impact"], "high");
    }

    #[test]
    fn asset_maps_keep_dashboard_order() {
        let snap = fixed(0).generate();
        let keys: Vec<&str> = snap.assets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["EURUSD", "BTCUSD", "SPX"]);
        let tilts: Vec<&str> = snap.asset_tilts.keys().map(String::as_str).collect();
        assert_eq!(tilts, keys);

        let body = serde_json::to_string(&snap).unwrap();
        let pos = |k: &str| body.find(&format!("\"{}\":{{\"current\"", k)).unwrap();
        assert!(pos("EURUSD") < pos("BTCUSD") && pos("BTCUSD") < pos("SPX"));

        let back: RiskSnapshot = serde_json::from_str(&body).unwrap();
        assert!(back.assets.keys().eq(snap.assets.keys()));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_simulated_latency() {
        let source = MockRiskSource::new(Arc::new(FixedJitter(0)));
        let began = tokio::time::Instant::now();
        let snap = source.fetch().await.unwrap();
        assert!(began.elapsed() >= DEFAULT_LATENCY);
        assert_eq!(snap.risk_score, 65);
    }
}
