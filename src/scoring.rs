use crate::models::{
    CountyReport, ForecastOutlook, RawObservation, RiskState, TrendBasis,
};

/// Version tag stamped on every persisted snapshot.
pub const MODEL_VERSION: &str = "fl-v1";

/// Trailing CAI window used for the trend signals, most-recent-last.
pub const HISTORY_WINDOW_DAYS: usize = 5;

/// Neutral trend scores substituted when history is too shallow for the
/// delta/range signals. Both sit in the lowest band of their calculator.
pub const STS_NEUTRAL: f64 = 10.0;
pub const VEX_NEUTRAL: f64 = 10.0;

pub fn clamp(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

pub fn density_factor(pop_density: f64) -> f64 {
    if pop_density < 200.0 {
        return 0.8;
    }
    if pop_density < 800.0 {
        return 1.0;
    }
    1.2
}

/// Florida hot-humid heat-index bands, inclusive upper bounds.
/// `month` is accepted for seasonal banding but unused in fl-v1.
pub fn heat_score(_month: u32, heat_index_f: f64) -> f64 {
    if heat_index_f <= 100.0 {
        return 10.0;
    }
    if heat_index_f <= 105.0 {
        return 25.0;
    }
    if heat_index_f <= 110.0 {
        return 45.0;
    }
    if heat_index_f <= 115.0 {
        return 65.0;
    }
    if heat_index_f <= 120.0 {
        return 80.0;
    }
    95.0
}

fn rain_score_basic(rain_24h_in: f64) -> f64 {
    if rain_24h_in < 1.0 {
        return 10.0;
    }
    if rain_24h_in < 2.0 {
        return 30.0;
    }
    if rain_24h_in < 4.0 {
        return 55.0;
    }
    if rain_24h_in < 6.0 {
        return 75.0;
    }
    90.0
}

/// 24h rainfall bands, strict upper bounds. A tropical system floors the
/// score at 70 regardless of the banded value.
pub fn rain_score(rain_24h_in: f64, tropical_flag: bool) -> f64 {
    if tropical_flag {
        return rain_score_basic(rain_24h_in).max(70.0);
    }
    rain_score_basic(rain_24h_in)
}

fn wind_score_basic(wind_sust_mph: f64) -> f64 {
    if wind_sust_mph < 20.0 {
        return 5.0;
    }
    if wind_sust_mph < 36.0 {
        return 30.0;
    }
    if wind_sust_mph < 51.0 {
        return 55.0;
    }
    if wind_sust_mph < 71.0 {
        return 75.0;
    }
    95.0
}

/// Sustained-wind bands, strict upper bounds. Tropical systems with sustained
/// wind at or above 35 mph floor the score at 75.
pub fn wind_score(wind_sust_mph: f64, tropical_flag: bool) -> f64 {
    if tropical_flag && wind_sust_mph >= 35.0 {
        return wind_score_basic(wind_sust_mph).max(75.0);
    }
    wind_score_basic(wind_sust_mph)
}

// Weather Pressure Score: heat 50%, rain 30%, wind 20%.
pub fn weather_pressure(heat: f64, rain: f64, wind: f64) -> f64 {
    clamp(0.50 * heat + 0.30 * rain + 0.20 * wind)
}

/// Impact/Severity Score. `persistence` is an externally supplied 0-100
/// trailing-heat-load proxy.
pub fn impact_severity(heat_score: f64, pop_density: f64, persistence: f64) -> f64 {
    let load_proxy = heat_score * density_factor(pop_density);
    clamp(0.70 * load_proxy + 0.30 * persistence)
}

/// Composite Activity Index, the headline regional risk number.
pub fn composite_activity(wps: f64, iss: f64, das: f64) -> f64 {
    clamp(0.40 * wps + 0.45 * iss + 0.15 * das)
}

/// Short-Term Trend from the 3-day CAI delta.
pub fn sts_from_delta(delta_3d: f64) -> f64 {
    if delta_3d <= 2.0 {
        return 10.0;
    }
    if delta_3d <= 6.0 {
        return 30.0;
    }
    if delta_3d <= 10.0 {
        return 55.0;
    }
    if delta_3d <= 15.0 {
        return 75.0;
    }
    if delta_3d <= 22.0 {
        return 90.0;
    }
    100.0
}

/// Volatility Exposure from the 5-day CAI range.
pub fn vex_from_range(range_5d: f64) -> f64 {
    if range_5d <= 6.0 {
        return 10.0;
    }
    if range_5d <= 12.0 {
        return 35.0;
    }
    if range_5d <= 18.0 {
        return 60.0;
    }
    if range_5d <= 26.0 {
        return 80.0;
    }
    95.0
}

/// Forward Pressure Component. Priority cascade, first true condition wins.
pub fn forward_pressure(
    forecast_wps_3d_avg: f64,
    wind_score_max_3d: f64,
    tropical_flag: bool,
) -> f64 {
    if tropical_flag {
        return 95.0;
    }
    if forecast_wps_3d_avg >= 65.0 || wind_score_max_3d >= 75.0 {
        return 80.0;
    }
    if (55.0..=64.0).contains(&forecast_wps_3d_avg) {
        return 60.0;
    }
    if (45.0..=54.0).contains(&forecast_wps_3d_avg) {
        return 35.0;
    }
    15.0
}

/// Rapid Wind Escalation Adjustment. Runs after `sts_from_delta` as a second
/// pass over the already-computed STS: a fast-rising wind score (+25 over
/// 48h, today at 55+) with tropical or high forecast pressure boosts STS by
/// 10, capped at 100.
pub fn rapid_wind_escalation(
    sts: f64,
    wind_today_score: f64,
    wind_48h_ago_score: f64,
    forecast_wps_3d_avg: f64,
    tropical_flag: bool,
) -> f64 {
    if (wind_today_score - wind_48h_ago_score) >= 25.0
        && wind_today_score >= 55.0
        && (tropical_flag || forecast_wps_3d_avg >= 55.0)
    {
        return (sts + 10.0).min(100.0);
    }
    sts
}

// Acceleration/Volatility composite: STS 50%, VEX 30%, FPC 20%.
pub fn acceleration_volatility(sts: f64, vex: f64, fpc: f64) -> f64 {
    clamp(0.50 * sts + 0.30 * vex + 0.20 * fpc)
}

/// Risk-state cascade over (CAI, AV). Order matters: Surge Risk pre-empts
/// everything else even when AV is low.
pub fn label_state(cai: f64, av: f64) -> RiskState {
    if cai >= 85.0 {
        return RiskState::SurgeRisk;
    }
    if cai >= 70.0 && av >= 56.0 {
        return RiskState::HighRiskAccelerating;
    }
    if av >= 76.0 {
        return RiskState::MomentumSurge;
    }
    if cai >= 55.0 || av >= 56.0 {
        return RiskState::Building;
    }
    RiskState::Stable
}

/// Trailing CAI values for one county, most-recent-last, capped at
/// [`HISTORY_WINDOW_DAYS`]. The delta and range accessors return `None`
/// instead of computing from a too-shallow window.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    values: Vec<f64>,
}

impl HistoryWindow {
    pub fn new(values: Vec<f64>) -> Self {
        let start = values.len().saturating_sub(HISTORY_WINDOW_DAYS);
        HistoryWindow {
            values: values[start..].to_vec(),
        }
    }

    /// Window over stored history plus today's freshly computed CAI.
    pub fn with_today(prior: &[f64], today_cai: f64) -> Self {
        let mut values = prior.to_vec();
        values.push(today_cai);
        HistoryWindow::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `cai_today - cai_3_days_ago`. Needs at least 4 entries.
    pub fn delta_3d(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 4 {
            return None;
        }
        Some(self.values[n - 1] - self.values[n - 4])
    }

    /// Max minus min over the window. Needs at least 2 entries.
    pub fn range(&self) -> Option<f64> {
        if self.values.len() < 2 {
            return None;
        }
        let max = self.values.iter().copied().fold(f64::MIN, f64::max);
        let min = self.values.iter().copied().fold(f64::MAX, f64::min);
        Some(max - min)
    }
}

/// Everything one composite scoring run consumes. The persistence, das,
/// wind-history, and forecast fields come from collaborator feeds; the CLI
/// injects documented fallbacks until those feeds are wired up.
#[derive(Debug, Clone)]
pub struct CountyInputs {
    pub observation: RawObservation,
    pub persistence: f64,
    pub das: f64,
    /// Stored trailing CAI values, most-recent-last, excluding today.
    pub prior_cai: Vec<f64>,
    pub wind_48h_ago_score: f64,
    pub forecast: Option<ForecastOutlook>,
}

/// Run the full composite pipeline for one county: normalizers, composites,
/// trend signals over the history window, RWEA, AV, and the state label.
pub fn compute_county_report(region: &str, county: &str, inputs: &CountyInputs) -> CountyReport {
    let obs = inputs.observation;

    let heat = heat_score(obs.month, obs.heat_index_f);
    let rain = rain_score(obs.rain_24h_in, obs.tropical_flag);
    let wind = wind_score(obs.wind_sust_mph, obs.tropical_flag);

    let wps = weather_pressure(heat, rain, wind);
    let iss = impact_severity(heat, obs.pop_density, inputs.persistence);
    let cai = composite_activity(wps, iss, inputs.das);

    let window = HistoryWindow::with_today(&inputs.prior_cai, cai);
    let delta_3d = window.delta_3d();
    let range_5d = window.range();
    let trend_basis = if delta_3d.is_some() && range_5d.is_some() {
        TrendBasis::Complete
    } else {
        TrendBasis::Insufficient
    };

    let sts_base = delta_3d.map(sts_from_delta).unwrap_or(STS_NEUTRAL);
    let vex = range_5d.map(vex_from_range).unwrap_or(VEX_NEUTRAL);

    let forecast = inputs
        .forecast
        .unwrap_or_else(|| ForecastOutlook::mirror_today(wps, wind));
    let fpc = forward_pressure(
        forecast.wps_3d_avg,
        forecast.wind_score_max_3d,
        obs.tropical_flag,
    );

    let sts = rapid_wind_escalation(
        sts_base,
        wind,
        inputs.wind_48h_ago_score,
        forecast.wps_3d_avg,
        obs.tropical_flag,
    );

    let av = acceleration_volatility(sts, vex, fpc);
    let state = label_state(cai, av);

    CountyReport {
        region: region.to_string(),
        county: county.to_string(),
        heat,
        rain,
        wind,
        wps,
        iss,
        das: inputs.das,
        cai,
        sts,
        vex,
        fpc,
        av,
        state,
        trend_basis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::{DAS_FALLBACK, PERSISTENCE_FALLBACK, WIND_48H_FALLBACK_SCORE};

    fn placeholder_observation() -> RawObservation {
        RawObservation {
            month: 2,
            heat_index_f: 92.0,
            rain_24h_in: 0.2,
            wind_sust_mph: 18.0,
            tropical_flag: false,
            pop_density: 1200.0,
        }
    }

    #[test]
    fn clamp_bounds_weighted_sums() {
        assert_eq!(clamp(-15.0), 0.0);
        assert_eq!(clamp(140.0), 100.0);
        assert_eq!(clamp(42.5), 42.5);
    }

    #[test]
    fn heat_bands_are_inclusive_on_upper_bound() {
        assert_eq!(heat_score(6, 100.0), 10.0);
        assert_eq!(heat_score(6, 100.1), 25.0);
        assert_eq!(heat_score(6, 105.0), 25.0);
        assert_eq!(heat_score(6, 110.0), 45.0);
        assert_eq!(heat_score(6, 115.0), 65.0);
        assert_eq!(heat_score(6, 120.0), 80.0);
        assert_eq!(heat_score(6, 121.0), 95.0);
    }

    #[test]
    fn rain_bands_are_strict_and_tropical_floors_at_70() {
        assert_eq!(rain_score(0.5, false), 10.0);
        assert_eq!(rain_score(1.0, false), 30.0);
        assert_eq!(rain_score(4.0, false), 75.0);
        assert_eq!(rain_score(6.0, false), 90.0);
        assert_eq!(rain_score(0.5, true), 70.0);
        assert_eq!(rain_score(6.0, true), 90.0);
    }

    #[test]
    fn wind_bands_and_tropical_floor() {
        assert_eq!(wind_score(18.0, false), 5.0);
        assert_eq!(wind_score(20.0, false), 30.0);
        assert_eq!(wind_score(40.0, false), 55.0);
        assert_eq!(wind_score(40.0, true), 75.0);
        assert_eq!(wind_score(80.0, false), 95.0);
        // below the 35 mph gate the tropical floor does not apply
        assert_eq!(wind_score(30.0, true), 30.0);
    }

    #[test]
    fn density_factor_tiers() {
        assert_eq!(density_factor(150.0), 0.8);
        assert_eq!(density_factor(200.0), 1.0);
        assert_eq!(density_factor(799.9), 1.0);
        assert_eq!(density_factor(1200.0), 1.2);
    }

    #[test]
    fn sts_and_vex_band_edges() {
        assert_eq!(sts_from_delta(-30.0), 10.0);
        assert_eq!(sts_from_delta(2.0), 10.0);
        assert_eq!(sts_from_delta(6.0), 30.0);
        assert_eq!(sts_from_delta(10.0), 55.0);
        assert_eq!(sts_from_delta(15.0), 75.0);
        assert_eq!(sts_from_delta(22.0), 90.0);
        assert_eq!(sts_from_delta(22.1), 100.0);

        assert_eq!(vex_from_range(0.0), 10.0);
        assert_eq!(vex_from_range(6.0), 10.0);
        assert_eq!(vex_from_range(12.0), 35.0);
        assert_eq!(vex_from_range(18.0), 60.0);
        assert_eq!(vex_from_range(26.0), 80.0);
        assert_eq!(vex_from_range(39.7), 95.0);
    }

    #[test]
    fn forward_pressure_cascade_order() {
        // tropical wins even with a calm forecast
        assert_eq!(forward_pressure(10.0, 5.0, true), 95.0);
        assert_eq!(forward_pressure(65.0, 5.0, false), 80.0);
        // wind max alone triggers the 80 branch
        assert_eq!(forward_pressure(10.0, 75.0, false), 80.0);
        assert_eq!(forward_pressure(60.0, 5.0, false), 60.0);
        assert_eq!(forward_pressure(50.0, 5.0, false), 35.0);
        assert_eq!(forward_pressure(30.0, 5.0, false), 15.0);
    }

    #[test]
    fn rwea_boosts_only_when_all_gates_pass() {
        // delta 30, today 60, forecast 60: boost applies
        assert_eq!(rapid_wind_escalation(30.0, 60.0, 30.0, 60.0, false), 40.0);
        // forecast below 55 and not tropical: unchanged
        assert_eq!(rapid_wind_escalation(30.0, 60.0, 30.0, 50.0, false), 30.0);
        // tropical substitutes for the forecast gate
        assert_eq!(rapid_wind_escalation(30.0, 60.0, 30.0, 50.0, true), 40.0);
        // slow escalation: unchanged
        assert_eq!(rapid_wind_escalation(30.0, 60.0, 40.0, 60.0, false), 30.0);
        // boost caps at 100
        assert_eq!(rapid_wind_escalation(95.0, 95.0, 30.0, 60.0, false), 100.0);
    }

    #[test]
    fn label_cascade_first_match_wins() {
        assert_eq!(label_state(90.0, 10.0), RiskState::SurgeRisk);
        assert_eq!(label_state(70.0, 56.0), RiskState::HighRiskAccelerating);
        assert_eq!(label_state(50.0, 80.0), RiskState::MomentumSurge);
        assert_eq!(label_state(55.0, 10.0), RiskState::Building);
        assert_eq!(label_state(10.0, 56.0), RiskState::Building);
        assert_eq!(label_state(14.28, 36.5), RiskState::Stable);
    }

    #[test]
    fn state_labels_render_expected_strings() {
        assert_eq!(RiskState::HighRiskAccelerating.to_string(), "High Risk + Accelerating");
        assert_eq!(RiskState::MomentumSurge.to_string(), "Momentum Surge");
        assert_eq!(RiskState::SurgeRisk.to_string(), "Surge Risk");
    }

    #[test]
    fn history_window_degrades_explicitly() {
        let shallow = HistoryWindow::new(vec![45.0, 47.0, 50.0]);
        assert!(shallow.delta_3d().is_none());
        assert!(shallow.range().is_some());

        let single = HistoryWindow::new(vec![45.0]);
        assert!(single.range().is_none());

        let full = HistoryWindow::new(vec![45.0, 47.0, 50.0, 54.0, 60.0]);
        assert_eq!(full.delta_3d(), Some(13.0));
        assert_eq!(full.range(), Some(15.0));
    }

    #[test]
    fn history_window_keeps_trailing_five() {
        let window = HistoryWindow::new(vec![1.0, 2.0, 45.0, 47.0, 50.0, 54.0, 60.0]);
        assert_eq!(window.values(), &[45.0, 47.0, 50.0, 54.0, 60.0]);
    }

    #[test]
    fn placeholder_inputs_reproduce_documented_scores() {
        let inputs = CountyInputs {
            observation: placeholder_observation(),
            persistence: PERSISTENCE_FALLBACK,
            das: DAS_FALLBACK,
            prior_cai: vec![45.0, 47.0, 50.0, 54.0],
            wind_48h_ago_score: WIND_48H_FALLBACK_SCORE,
            forecast: None,
        };
        let report = compute_county_report("FL", "Duval", &inputs);

        assert_eq!(report.heat, 10.0);
        assert_eq!(report.rain, 10.0);
        assert_eq!(report.wind, 5.0);
        assert!((report.wps - 9.0).abs() < 1e-9);
        assert!((report.iss - 20.4).abs() < 1e-9);
        assert!((report.cai - 14.28).abs() < 1e-9);
        assert_eq!(report.state, RiskState::Stable);
        assert_eq!(report.trend_basis, TrendBasis::Complete);
    }

    #[test]
    fn shallow_history_yields_neutral_trend_scores() {
        let inputs = CountyInputs {
            observation: placeholder_observation(),
            persistence: PERSISTENCE_FALLBACK,
            das: DAS_FALLBACK,
            prior_cai: vec![],
            wind_48h_ago_score: WIND_48H_FALLBACK_SCORE,
            forecast: None,
        };
        let report = compute_county_report("FL", "Duval", &inputs);

        assert_eq!(report.sts, STS_NEUTRAL);
        assert_eq!(report.vex, VEX_NEUTRAL);
        assert_eq!(report.trend_basis, TrendBasis::Insufficient);
    }
}
