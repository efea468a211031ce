use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};

use crate::{
    actuator::CommandLogEntry,
    sensor::{Metric, Sample, SensorRecord},
    store::TimeSeriesStore,
};

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore for PgStore {
    async fn append(&self, sample: &Sample) -> Result<()> {
        // Table names come from `Metric::collection`, never from input.
        let query = format!(
            "INSERT INTO {} (sensor_id, date, value) VALUES ($1, $2, $3)",
            sample.metric.collection()
        );

        sqlx::query(&query)
            .bind(&sample.sensor_id)
            .bind(sample.timestamp)
            .bind(sample.value)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to insert {} sample", sample.metric))?;

        Ok(())
    }

    async fn window(
        &self,
        metric: Metric,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        let query = format!(
            "SELECT sensor_id, date, value FROM {} WHERE date > $1 AND date <= $2 ORDER BY date",
            metric.collection()
        );

        let rows: Vec<(String, DateTime<Utc>, f64)> = sqlx::query_as(&query)
            .bind(begin)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to query {metric} samples"))?;

        Ok(rows
            .into_iter()
            .map(|(sensor_id, timestamp, value)| Sample {
                sensor_id,
                metric,
                value,
                timestamp,
            })
            .collect())
    }

    async fn log_command(&self, entry: &CommandLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO actuator_commands (executor, address, command, answer, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&entry.executor)
        .bind(&entry.address)
        .bind(Json(&entry.command))
        .bind(Json(&entry.answer))
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .context("failed to insert actuator command log entry")?;

        Ok(())
    }

    async fn upsert_sensor(&self, record: &SensorRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sensor_registry (name, token, pragma)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET token = EXCLUDED.token, pragma = EXCLUDED.pragma
            "#,
        )
        .bind(&record.name)
        .bind(&record.token)
        .bind(&record.pragma)
        .execute(&self.pool)
        .await
        .context("failed to upsert sensor registry entry")?;

        Ok(())
    }

    async fn sensors(&self) -> Result<Vec<SensorRecord>> {
        sqlx::query_as::<_, SensorRecord>("SELECT name, token, pragma FROM sensor_registry")
            .fetch_all(&self.pool)
            .await
            .context("failed to load sensor registry")
    }
}
