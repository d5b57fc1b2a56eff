use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::SnapshotRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Seed the fabricated 4-day CAI history the fl-v1 model shipped with
/// (45, 47, 50, 54 leading up to today), for a few pilot counties.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let counties = ["Duval", "Orange", "Miami-Dade"];
    let prior = [45.0_f64, 47.0, 50.0, 54.0];
    let today = Utc::now().date_naive();

    for county in counties {
        for (i, cai) in prior.iter().enumerate() {
            let days_back = (prior.len() - i) as i64;
            let observed_on = today - Duration::days(days_back);
            record_cai(pool, "FL", county, observed_on, *cai).await?;
        }
    }

    Ok(())
}

/// Trailing CAI values for a county, most-recent-last, at most `limit` rows.
pub async fn fetch_cai_history(
    pool: &PgPool,
    county: &str,
    limit: i64,
) -> anyhow::Result<Vec<f64>> {
    let rows = sqlx::query(
        "SELECT cai FROM daymark.cai_history \
         WHERE county = $1 \
         ORDER BY observed_on DESC \
         LIMIT $2",
    )
    .bind(county)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to fetch CAI history")?;

    let mut history: Vec<f64> = rows.iter().map(|row| row.get("cai")).collect();
    history.reverse();
    Ok(history)
}

/// Upsert one day's CAI value for a county.
pub async fn record_cai(
    pool: &PgPool,
    region: &str,
    county: &str,
    observed_on: NaiveDate,
    cai: f64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daymark.cai_history (region, county, observed_on, cai)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (county, observed_on) DO UPDATE
        SET cai = EXCLUDED.cai, region = EXCLUDED.region
        "#,
    )
    .bind(region)
    .bind(county)
    .bind(observed_on)
    .bind(cai)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append one snapshot row. Snapshots are never updated or deleted.
pub async fn insert_snapshot(pool: &PgPool, snapshot: &SnapshotRecord) -> anyhow::Result<()> {
    let scores = serde_json::to_value(&snapshot.scores)?;

    sqlx::query(
        r#"
        INSERT INTO daymark.snapshots
        (id, run_id, snapshot_at, region, county, scores, state_label, model_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(snapshot.run_id)
    .bind(snapshot.snapshot_at)
    .bind(&snapshot.region)
    .bind(&snapshot.county)
    .bind(scores)
    .bind(&snapshot.state_label)
    .bind(&snapshot.model_version)
    .execute(pool)
    .await
    .context("failed to insert snapshot")?;

    Ok(())
}

/// Backfill CAI history from a CSV export. Rows already present for a
/// (county, day) pair are skipped.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        county: String,
        region: Option<String>,
        observed_on: NaiveDate,
        cai: f64,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let region = row.region.unwrap_or_else(|| "FL".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO daymark.cai_history (region, county, observed_on, cai)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (county, observed_on) DO NOTHING
            "#,
        )
        .bind(&region)
        .bind(&row.county)
        .bind(row.observed_on)
        .bind(row.cai)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
