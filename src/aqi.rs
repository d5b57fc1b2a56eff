use std::fmt;

/// EPA PM2.5 breakpoint rows: (c_low, c_high, i_low, i_high).
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 7] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 350.4, 301.0, 400.0),
    (350.5, 500.4, 401.0, 500.0),
];

/// Convert a PM2.5 concentration (µg/m³) to an AQI value by EPA
/// piecewise-linear interpolation. Negative readings clamp to 0;
/// concentrations above 500.4 saturate to AQI 500.
pub fn pm25_to_aqi(pm: f64) -> f64 {
    let pm = pm.max(0.0);
    for (c_low, c_high, i_low, i_high) in PM25_BREAKPOINTS {
        if pm <= c_high {
            let aqi = (i_high - i_low) / (c_high - c_low) * (pm - c_low) + i_low;
            return aqi.round();
        }
    }
    500.0
}

/// Reporting category for a numeric AQI. The daily pipeline folds everything
/// above 100 into one "Unhealthy" bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    Unhealthy,
}

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            return AqiCategory::Good;
        }
        if aqi <= 100.0 {
            return AqiCategory::Moderate;
        }
        AqiCategory::Unhealthy
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Unhealthy => "Unhealthy",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(pm25_to_aqi(-5.0), pm25_to_aqi(0.0));
        assert_eq!(pm25_to_aqi(0.0), 0.0);
    }

    #[test]
    fn off_the_chart_readings_saturate_at_500() {
        assert_eq!(pm25_to_aqi(1000.0), 500.0);
        assert_eq!(pm25_to_aqi(500.5), 500.0);
        assert_eq!(pm25_to_aqi(500.4), 500.0);
    }

    #[test]
    fn interpolation_matches_epa_reference_points() {
        assert_eq!(pm25_to_aqi(12.0), 50.0);
        assert_eq!(pm25_to_aqi(35.4), 100.0);
        assert_eq!(pm25_to_aqi(55.4), 150.0);
        // midpoint of the Good band
        assert_eq!(pm25_to_aqi(6.0), 25.0);
    }

    #[test]
    fn monotonically_non_decreasing_over_samples() {
        let samples = [
            0.0, 1.0, 5.0, 11.9, 12.0, 12.1, 20.0, 35.4, 35.5, 55.0, 100.0, 150.4, 150.5, 250.0,
            350.5, 499.0, 500.4, 600.0,
        ];
        let mut last = f64::MIN;
        for pm in samples {
            let aqi = pm25_to_aqi(pm);
            assert!(
                aqi >= last,
                "AQI dropped from {last} to {aqi} at pm {pm}"
            );
            last = aqi;
        }
    }

    #[test]
    fn categories_split_at_50_and_100() {
        assert_eq!(AqiCategory::from_aqi(42.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(100.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(101.0), AqiCategory::Unhealthy);
    }
}
