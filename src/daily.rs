use crate::aqi::AqiCategory;
use crate::models::{DailyStatus, StatusTier};

/// Score deltas contributed by each air-quality category. Tunable per
/// deployment; the default keeps Good and Moderate neutral and weights
/// Unhealthy at +25.
#[derive(Debug, Clone, Copy)]
pub struct AqiScoreWeights {
    pub good: i64,
    pub moderate: i64,
    pub unhealthy: i64,
}

impl Default for AqiScoreWeights {
    fn default() -> Self {
        AqiScoreWeights {
            good: 0,
            moderate: 0,
            unhealthy: 25,
        }
    }
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

/// Status tier from the accumulated score.
pub fn status_tier(score: i64) -> StatusTier {
    if score <= 24 {
        return StatusTier::Green;
    }
    if score <= 44 {
        return StatusTier::Yellow;
    }
    if score <= 64 {
        return StatusTier::Orange;
    }
    StatusTier::Red
}

/// Fold the alert count and an optional AQI reading into one daily status.
/// An absent AQI is a valid outcome (no provider coverage), reported as its
/// own driver with no score contribution. The recommended-items list is
/// deduplicated preserving first-occurrence order.
pub fn daily_status(
    alert_count: u32,
    aqi: Option<f64>,
    weights: &AqiScoreWeights,
) -> DailyStatus {
    let mut score: i64 = 0;
    let mut drivers = Vec::new();
    let mut add_items = Vec::new();

    match alert_count {
        0 => drivers.push("No active weather alerts".to_string()),
        1 => {
            score += 20;
            drivers.push("1 active weather alert".to_string());
            push_unique(&mut add_items, "rain shell");
            push_unique(&mut add_items, "waterproof pouch");
            push_unique(&mut add_items, "flashlight");
        }
        n => {
            score += 35;
            drivers.push(format!("{n} active weather alerts"));
            push_unique(&mut add_items, "rain shell");
            push_unique(&mut add_items, "waterproof pouch");
            push_unique(&mut add_items, "flashlight");
            push_unique(&mut add_items, "power bank");
        }
    }

    match aqi {
        None => drivers.push("Air quality data unavailable".to_string()),
        Some(value) => {
            let category = AqiCategory::from_aqi(value);
            drivers.push(format!("Air quality: {category}"));
            score += match category {
                AqiCategory::Good => weights.good,
                AqiCategory::Moderate => weights.moderate,
                AqiCategory::Unhealthy => weights.unhealthy,
            };
            if category == AqiCategory::Unhealthy {
                push_unique(&mut add_items, "mask");
            }
        }
    }

    DailyStatus {
        status: status_tier(score),
        score,
        drivers,
        add_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_day_is_green() {
        let status = daily_status(0, Some(42.0), &AqiScoreWeights::default());
        assert_eq!(status.status, StatusTier::Green);
        assert_eq!(status.score, 0);
        assert_eq!(
            status.drivers,
            vec!["No active weather alerts", "Air quality: Good"]
        );
        assert!(status.add_items.is_empty());
    }

    #[test]
    fn single_alert_is_green_edge() {
        let status = daily_status(1, Some(42.0), &AqiScoreWeights::default());
        assert_eq!(status.score, 20);
        assert_eq!(status.status, StatusTier::Green);
        assert_eq!(
            status.add_items,
            vec!["rain shell", "waterproof pouch", "flashlight"]
        );
    }

    #[test]
    fn multiple_alerts_with_unhealthy_air_is_orange() {
        let status = daily_status(3, Some(130.0), &AqiScoreWeights::default());
        assert_eq!(status.score, 60);
        assert_eq!(status.status, StatusTier::Orange);
        assert_eq!(
            status.drivers,
            vec!["3 active weather alerts", "Air quality: Unhealthy"]
        );
        assert_eq!(
            status.add_items,
            vec![
                "rain shell",
                "waterproof pouch",
                "flashlight",
                "power bank",
                "mask"
            ]
        );
    }

    #[test]
    fn missing_aqi_degrades_to_unavailable_driver() {
        let status = daily_status(2, None, &AqiScoreWeights::default());
        assert_eq!(status.score, 35);
        assert!(status
            .drivers
            .contains(&"Air quality data unavailable".to_string()));
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(status_tier(0), StatusTier::Green);
        assert_eq!(status_tier(24), StatusTier::Green);
        assert_eq!(status_tier(25), StatusTier::Yellow);
        assert_eq!(status_tier(44), StatusTier::Yellow);
        assert_eq!(status_tier(45), StatusTier::Orange);
        assert_eq!(status_tier(64), StatusTier::Orange);
        assert_eq!(status_tier(65), StatusTier::Red);
    }

    #[test]
    fn gear_list_stays_deduplicated_in_first_seen_order() {
        let mut items = vec!["rain shell".to_string()];
        push_unique(&mut items, "flashlight");
        push_unique(&mut items, "rain shell");
        push_unique(&mut items, "flashlight");
        push_unique(&mut items, "mask");
        assert_eq!(items, vec!["rain shell", "flashlight", "mask"]);
    }

    #[test]
    fn aqi_weights_are_configuration() {
        let weights = AqiScoreWeights {
            good: 0,
            moderate: 10,
            unhealthy: 25,
        };
        let status = daily_status(0, Some(80.0), &weights);
        assert_eq!(status.score, 10);
        assert_eq!(status.status, StatusTier::Green);
    }
}
