//! `RiskSnapshot` and its nested reports.
//!
//! Field names on the wire follow the dashboard payload (`desc`, `vix`,
//! `sp500_points`, ...) so a future REST backend can return the same JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::RiskError;

/// Scores below this are SAFE.
pub const SAFE_BELOW: u8 = 40;
/// Scores above this are HIGH.
pub const HIGH_ABOVE: u8 = 75;
/// Above this score the volatility regime reads risk-off.
pub const RISK_OFF_ABOVE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Safe,
    Medium,
    High,
}

impl RiskCategory {
    pub fn from_score(score: u8) -> Self {
        if score < SAFE_BELOW {
            RiskCategory::Safe
        } else if score > HIGH_ABOVE {
            RiskCategory::High
        } else {
            RiskCategory::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Safe => "SAFE",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolatilityRegime {
    RiskOff,
    Neutral,
    RiskOn,
}

impl VolatilityRegime {
    pub fn from_score(score: u8) -> Self {
        if score > RISK_OFF_ABOVE {
            VolatilityRegime::RiskOff
        } else {
            VolatilityRegime::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRegime::RiskOff => "risk-off",
            VolatilityRegime::Neutral => "neutral",
            VolatilityRegime::RiskOn => "risk-on",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReason {
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "value")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub current: f64,
    pub change: f64,
    pub regime: VolatilityRegime,
    pub yesterday: f64,
    pub high_5d: f64,
    pub low_5d: f64,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedMove {
    pub percent: f64,
    #[serde(rename = "sp500_points")]
    pub index_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextEvent {
    #[serde(rename = "event")]
    pub name: String,
    pub hours_away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroEvent {
    pub time: String,
    #[serde(rename = "event")]
    pub name: String,
    pub consensus: String,
    pub previous: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetExtremes {
    pub current: f64,
    pub weekly_high: f64,
    pub weekly_low: f64,
    #[serde(rename = "distance_to_extreme")]
    pub distance_to_extreme_pct: f64,
    pub nearest_extreme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTilt {
    pub tilt: String,
    pub color: TiltColor,
    #[serde(rename = "text")]
    pub note: String,
}

/// One risk-analysis result. Built fresh per call and owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    /// Local wall-clock time of generation, `HH:MM`.
    pub last_update: String,
    pub reasons: Vec<RiskReason>,
    pub components: IndexMap<String, f64>,
    #[serde(rename = "vix")]
    pub volatility: VolatilityReport,
    pub expected_move: ExpectedMove,
    pub next_event: NextEvent,
    pub macro_events: Vec<MacroEvent>,
    pub assets: IndexMap<String, AssetExtremes>,
    pub asset_tilts: IndexMap<String, AssetTilt>,
}

impl RiskSnapshot {
    /// Reject payloads that break the score invariants.
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.risk_score > 100 {
            return Err(RiskError::InvalidResponse(format!(
                "risk_score {} outside 0..=100",
                self.risk_score
            )));
        }
        let expected = RiskCategory::from_score(self.risk_score);
        if self.risk_category != expected {
            return Err(RiskError::InvalidResponse(format!(
                "risk_category {} does not match score {} (expected {})",
                self.risk_category.as_str(),
                self.risk_score,
                expected.as_str()
            )));
        }
        Ok(())
    }
}
