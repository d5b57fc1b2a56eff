use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One day's raw environmental measurements for a county.
/// Built fresh per scoring run; fields are pre-validated by the caller
/// (month 1-12, non-negative measurements).
#[derive(Debug, Clone, Copy)]
pub struct RawObservation {
    pub month: u32,
    pub heat_index_f: f64,
    pub rain_24h_in: f64,
    pub wind_sust_mph: f64,
    pub tropical_flag: bool,
    pub pop_density: f64,
}

/// Forecast aggregates consumed by the forward-pressure signal.
#[derive(Debug, Clone, Copy)]
pub struct ForecastOutlook {
    pub wps_3d_avg: f64,
    pub wind_score_max_3d: f64,
}

impl ForecastOutlook {
    /// Stand-in until a forecast feed is wired up: mirror today's values.
    pub fn mirror_today(wps: f64, wind_score: f64) -> Self {
        ForecastOutlook {
            wps_3d_avg: wps,
            wind_score_max_3d: wind_score,
        }
    }
}

/// Whether the trailing CAI history was deep enough for the trend signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBasis {
    Complete,
    Insufficient,
}

/// Discrete risk state derived from (CAI, AV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskState {
    Stable,
    Building,
    MomentumSurge,
    HighRiskAccelerating,
    SurgeRisk,
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskState::Stable => "Stable",
            RiskState::Building => "Building",
            RiskState::MomentumSurge => "Momentum Surge",
            RiskState::HighRiskAccelerating => "High Risk + Accelerating",
            RiskState::SurgeRisk => "Surge Risk",
        };
        write!(f, "{label}")
    }
}

/// Full output of one composite scoring run for a county.
#[derive(Debug, Clone)]
pub struct CountyReport {
    pub region: String,
    pub county: String,
    pub heat: f64,
    pub rain: f64,
    pub wind: f64,
    pub wps: f64,
    pub iss: f64,
    pub das: f64,
    pub cai: f64,
    pub sts: f64,
    pub vex: f64,
    pub fpc: f64,
    pub av: f64,
    pub state: RiskState,
    pub trend_basis: TrendBasis,
}

impl CountyReport {
    /// Scores map as persisted in a snapshot row.
    pub fn scores_map(&self) -> BTreeMap<String, f64> {
        let mut scores = BTreeMap::new();
        scores.insert("heat".to_string(), self.heat);
        scores.insert("rain".to_string(), self.rain);
        scores.insert("wind".to_string(), self.wind);
        scores.insert("wps".to_string(), self.wps);
        scores.insert("iss".to_string(), self.iss);
        scores.insert("das".to_string(), self.das);
        scores.insert("cai".to_string(), self.cai);
        scores.insert("sts".to_string(), self.sts);
        scores.insert("vex".to_string(), self.vex);
        scores.insert("fpc".to_string(), self.fpc);
        scores.insert("av".to_string(), self.av);
        scores
    }
}

/// Daily status tier for the coordinate-level pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusTier {
    Green,
    Yellow,
    Orange,
    Red,
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusTier::Green => "GREEN",
            StatusTier::Yellow => "YELLOW",
            StatusTier::Orange => "ORANGE",
            StatusTier::Red => "RED",
        };
        write!(f, "{label}")
    }
}

/// Per-request daily status. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DailyStatus {
    pub status: StatusTier,
    pub score: i64,
    pub drivers: Vec<String>,
    pub add_items: Vec<String>,
}

/// Append-only snapshot row, one per county per collection run.
#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    pub run_id: Uuid,
    pub snapshot_at: DateTime<Utc>,
    pub region: String,
    pub county: String,
    pub scores: BTreeMap<String, f64>,
    pub state_label: String,
    pub model_version: String,
}
