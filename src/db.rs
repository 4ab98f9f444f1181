//! Database connection pool management and storage conversions
//!
//! The estimator computes in `f64`; money is stored as `NUMERIC` and counts
//! as `INTEGER`. Conversions happen only at this boundary.

use anyhow::{anyhow, Context, Result};
use rust_decimal::prelude::*;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Settings;

/// Create a PostgreSQL connection pool with optimized settings
pub async fn create_pool(settings: &Settings) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&settings.database_url)
        .context("Invalid DATABASE_URL")?
        .application_name("bidvita-estimator");

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tracing::info!(
        max_connections = settings.database_max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

/// Apply embedded migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Lightweight health check for database connectivity
pub async fn health_check(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}

/// Money value for a `NUMERIC` column, at cent precision.
pub fn to_money(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| anyhow!("{value} cannot be stored as money"))
}

pub fn from_money(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| anyhow!("stored money {value} has no f64 form"))
}

pub fn to_count(value: u32) -> Result<i32> {
    i32::try_from(value).with_context(|| format!("{value} does not fit a count column"))
}

pub fn from_count(value: i32) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("stored count {value} is negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_round_trip() {
        for value in [0.0, 25126.1, 120738.99, 355332.03, 593.21, 646028.13, 871748.8] {
            assert_eq!(from_money(to_money(value).unwrap()).unwrap(), value);
        }
    }

    #[test]
    fn test_money_rejects_non_finite() {
        assert!(to_money(f64::NAN).is_err());
        assert!(to_money(f64::INFINITY).is_err());
    }

    #[test]
    fn test_money_from_numeric_column() {
        // NUMERIC(14,2) values arrive with scale 2
        assert_eq!(from_money(Decimal::new(98_765_432, 2)).unwrap(), 987654.32);
        assert_eq!(from_money(Decimal::new(-150, 2)).unwrap(), -1.5);
        assert_eq!(from_money(Decimal::ZERO).unwrap(), 0.0);
    }

    #[test]
    fn test_counts() {
        assert_eq!(to_count(66).unwrap(), 66);
        assert_eq!(from_count(76).unwrap(), 76);
        assert!(from_count(-1).is_err());
        assert!(to_count(u32::MAX).is_err());
    }
}
