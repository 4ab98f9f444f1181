#[macro_use]
mod macros;

mod api;
mod app;
mod config;
mod db;
mod domain;
mod error;
mod estimation;
mod logging;
mod routes;
mod services;

use anyhow::Result;

use services::RedisCache;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting bid estimator"
    );

    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await?;

    let cache = RedisCache::new(&settings.redis_url, settings.redis_cache_ttl_seconds).await?;

    let state = app::AppState::new(pool, settings.clone(), cache);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
