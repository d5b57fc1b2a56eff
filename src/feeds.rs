use std::str::FromStr;

/// Trailing-heat-load persistence proxy used until the measurement feed
/// computes it from the last 10 days of heat scores.
pub const PERSISTENCE_FALLBACK: f64 = 40.0;

/// Disruption adjustment score default for fl-v1.
pub const DAS_FALLBACK: f64 = 10.0;

/// Wind score assumed for 48h ago until wind history is fed from the store.
pub const WIND_48H_FALLBACK_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Weather-alert feed: number of active alerts covering a coordinate.
pub trait AlertFeed {
    fn alert_count(&self, coord: Coord) -> anyhow::Result<u32>;
}

/// Air-quality feed. `Ok(None)` means no provider coverage for the
/// coordinate, which is a valid outcome rather than an error.
pub trait AqiProvider {
    fn fetch_aqi(&self, coord: Coord) -> anyhow::Result<Option<f64>>;
}

/// Which air-quality backend to talk to. Scoring never branches on this;
/// it only selects the provider implementation at wiring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAq,
    AirNow,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openaq" => Ok(ProviderKind::OpenAq),
            "airnow" => Ok(ProviderKind::AirNow),
            other => anyhow::bail!("unknown AQI provider '{other}' (expected openaq or airnow)"),
        }
    }
}

/// Feed configuration resolved once at startup. The AirNow key is a secret
/// injected from the environment, never a source literal.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
}

impl FeedSettings {
    pub fn new(provider: ProviderKind, api_key: Option<String>) -> anyhow::Result<Self> {
        if provider == ProviderKind::AirNow && api_key.is_none() {
            anyhow::bail!("DAYMARK_AQI_API_KEY must be set when the AirNow provider is selected");
        }
        Ok(FeedSettings { provider, api_key })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let provider = match std::env::var("DAYMARK_AQI_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => ProviderKind::OpenAq,
        };
        let api_key = std::env::var("DAYMARK_AQI_API_KEY").ok();
        FeedSettings::new(provider, api_key)
    }
}

/// Fixed-value alert feed. The HTTP-backed NWS feed is wiring glue outside
/// this crate; the CLI injects observed counts through this stand-in.
#[derive(Debug, Clone, Copy)]
pub struct StaticAlertFeed {
    pub count: u32,
}

impl AlertFeed for StaticAlertFeed {
    fn alert_count(&self, _coord: Coord) -> anyhow::Result<u32> {
        Ok(self.count)
    }
}

/// Fixed-value AQI provider, same role as [`StaticAlertFeed`].
#[derive(Debug, Clone, Copy)]
pub struct StaticAqiFeed {
    pub aqi: Option<f64>,
}

impl AqiProvider for StaticAqiFeed {
    fn fetch_aqi(&self, _coord: Coord) -> anyhow::Result<Option<f64>> {
        Ok(self.aqi)
    }
}
