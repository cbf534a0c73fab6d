use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;

use crate::config::Config;

/// Creates a PostgreSQL connection pool
///
/// The password is applied on top of the connection URL so the credential can be
/// supplied separately from the endpoint. Connects eagerly, so an unreachable or
/// misconfigured store fails startup.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.database_url)?
        .password(&config.database_password);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to experiences store"
    );

    Ok(pool)
}
