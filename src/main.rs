use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod aqi;
mod daily;
mod db;
mod feeds;
mod models;
mod report;
mod scoring;

use daily::AqiScoreWeights;
use feeds::{
    AlertFeed, AqiProvider, Coord, FeedSettings, StaticAlertFeed, StaticAqiFeed, DAS_FALLBACK,
    PERSISTENCE_FALLBACK, WIND_48H_FALLBACK_SCORE,
};
use models::{RawObservation, SnapshotRecord, TrendBasis};
use scoring::{compute_county_report, CountyInputs, HISTORY_WINDOW_DAYS, MODEL_VERSION};

#[derive(Parser)]
#[command(name = "daymark")]
#[command(about = "Weather-risk index and daily status for Florida counties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Raw measurements for today's scoring run. Defaults are the fl-v1
/// placeholder observation used until the weather feed is wired in.
#[derive(Args)]
struct ObservationArgs {
    #[arg(long, default_value_t = 2)]
    month: u32,
    #[arg(long, default_value_t = 92.0)]
    heat_index_f: f64,
    #[arg(long, default_value_t = 0.2)]
    rain_24h_in: f64,
    #[arg(long, default_value_t = 18.0)]
    wind_sust_mph: f64,
    #[arg(long)]
    tropical: bool,
    #[arg(long, default_value_t = 1200.0)]
    pop_density: f64,
}

impl ObservationArgs {
    fn to_observation(&self) -> RawObservation {
        RawObservation {
            month: self.month,
            heat_index_f: self.heat_index_f,
            rain_24h_in: self.rain_24h_in,
            wind_sust_mph: self.wind_sust_mph,
            tropical_flag: self.tropical,
            pop_density: self.pop_density,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the fl-v1 pilot CAI history
    Seed,
    /// Backfill CAI history from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Daily status for a coordinate (alerts + air quality)
    DailyStatus {
        #[arg(long, default_value_t = 30.33, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, default_value_t = -81.66, allow_negative_numbers = true)]
        lon: f64,
        /// Active alert count observed from the alert feed
        #[arg(long, default_value_t = 0)]
        alerts: u32,
        /// AQI reading; omit when the provider has no coverage
        #[arg(long)]
        aqi: Option<f64>,
        /// PM2.5 concentration, converted to AQI when --aqi is absent
        #[arg(long)]
        pm25: Option<f64>,
    },
    /// Compute the composite report for one county
    Score {
        #[arg(long, default_value = "Duval")]
        county: String,
        #[arg(long, default_value = "FL")]
        region: String,
        #[command(flatten)]
        observation: ObservationArgs,
    },
    /// Compute and persist snapshots for a set of counties under one run
    Collect {
        #[arg(long, value_delimiter = ',', default_value = "Duval")]
        counties: Vec<String>,
        #[arg(long, default_value = "FL")]
        region: String,
        #[command(flatten)]
        observation: ObservationArgs,
    },
    /// Generate a markdown county report
    Report {
        #[arg(long, default_value = "Duval")]
        county: String,
        #[arg(long, default_value = "FL")]
        region: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        observation: ObservationArgs,
    },
}

async fn connect_pool() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn county_inputs(observation: RawObservation, prior_cai: Vec<f64>) -> CountyInputs {
    CountyInputs {
        observation,
        persistence: PERSISTENCE_FALLBACK,
        das: DAS_FALLBACK,
        prior_cai,
        wind_48h_ago_score: WIND_48H_FALLBACK_SCORE,
        forecast: None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DailyStatus {
            lat,
            lon,
            alerts,
            aqi,
            pm25,
        } => {
            // Fails fast on a bad provider selection or a missing key; the
            // HTTP backends it selects between live outside this crate.
            let _settings = FeedSettings::from_env()?;
            let coord = Coord { lat, lon };

            let alert_feed = StaticAlertFeed { count: alerts };
            let aqi_feed = StaticAqiFeed {
                aqi: aqi.or_else(|| pm25.map(aqi::pm25_to_aqi)),
            };

            // Feed failures degrade per-feed instead of failing the status.
            let alert_count = alert_feed.alert_count(coord).unwrap_or(0);
            let aqi_value = aqi_feed.fetch_aqi(coord).unwrap_or(None);

            let status = daily::daily_status(alert_count, aqi_value, &AqiScoreWeights::default());

            println!("Status: {} (score {})", status.status, status.score);
            println!("Drivers:");
            for driver in &status.drivers {
                println!("- {driver}");
            }
            if !status.add_items.is_empty() {
                println!("Recommended items:");
                for item in &status.add_items {
                    println!("- {item}");
                }
            }
        }
        Commands::InitDb => {
            let pool = connect_pool().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect_pool().await?;
            db::seed(&pool).await?;
            println!("Pilot CAI history inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect_pool().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} history rows from {}.", csv.display());
        }
        Commands::Score {
            county,
            region,
            observation,
        } => {
            let pool = connect_pool().await?;
            let prior_cai =
                db::fetch_cai_history(&pool, &county, (HISTORY_WINDOW_DAYS - 1) as i64).await?;
            let inputs = county_inputs(observation.to_observation(), prior_cai);
            let report = compute_county_report(&region, &county, &inputs);

            println!("{} County, {}: {}", report.county, report.region, report.state);
            for (name, value) in report.scores_map() {
                println!("- {name} {value:.2}");
            }
            if report.trend_basis == TrendBasis::Insufficient {
                println!("History too shallow for trend signals; neutral scores used.");
            }
        }
        Commands::Collect {
            counties,
            region,
            observation,
        } => {
            let pool = connect_pool().await?;
            let run_id = Uuid::new_v4();
            let snapshot_at = Utc::now();
            let today = snapshot_at.date_naive();

            for county in &counties {
                let prior_cai =
                    db::fetch_cai_history(&pool, county, (HISTORY_WINDOW_DAYS - 1) as i64).await?;
                let inputs = county_inputs(observation.to_observation(), prior_cai);
                let report = compute_county_report(&region, county, &inputs);

                let snapshot = SnapshotRecord {
                    run_id,
                    snapshot_at,
                    region: region.clone(),
                    county: county.clone(),
                    scores: report.scores_map(),
                    state_label: report.state.to_string(),
                    model_version: MODEL_VERSION.to_string(),
                };
                db::insert_snapshot(&pool, &snapshot).await?;
                db::record_cai(&pool, &region, county, today, report.cai).await?;

                println!(
                    "- {} County: CAI {:.2}, state {}",
                    county, report.cai, report.state
                );
            }

            println!("Run {run_id} recorded {} snapshots.", counties.len());
        }
        Commands::Report {
            county,
            region,
            out,
            observation,
        } => {
            let pool = connect_pool().await?;
            let prior_cai =
                db::fetch_cai_history(&pool, &county, (HISTORY_WINDOW_DAYS - 1) as i64).await?;
            let county_report = compute_county_report(
                &region,
                &county,
                &county_inputs(observation.to_observation(), prior_cai.clone()),
            );
            let history = scoring::HistoryWindow::new(prior_cai);
            let markdown =
                report::build_report(&county_report, &history, Utc::now().date_naive());
            std::fs::write(&out, markdown)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
