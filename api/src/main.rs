use actix_web::web;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{error, info};

use mq_api::{server, telemetry, AppState, Repositories};
use mq_core::services::{ShutdownCoordinator, TokenCleanupService};
use mq_infra::database::{DatabasePool, MySqlMovieRepository, MySqlTokenRepository, MySqlUserRepository};
use mq_infra::mail::build_mailer;
use mq_shared::config::AppConfig;

const TOKEN_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Marquee API server"
    );

    let pool = DatabasePool::new(&config.database)
        .await
        .context("failed to connect to the database")?;
    if !pool.health_check().await.context("database health check failed")? {
        anyhow::bail!("database health check returned an unexpected value");
    }
    info!(pool = %pool.get_statistics(), "Database ready");
    let repositories = Repositories {
        movies: Arc::new(MySqlMovieRepository::new(pool.get_pool().clone())),
        users: Arc::new(MySqlUserRepository::new(pool.get_pool().clone())),
        tokens: Arc::new(MySqlTokenRepository::new(pool.get_pool().clone())),
    };
    let mailer = build_mailer(&config.mail)?;

    // Tracked tasks run on this runtime, which outlives the actix workers
    let shutdown = ShutdownCoordinator::with_runtime(Handle::current());
    let state = web::Data::new(AppState::new(&config, repositories.clone(), mailer, shutdown));

    let sweeper = state.rate_limiter.spawn_sweeper(config.rate_limit.sweep_interval());
    let cleanup =
        Arc::new(TokenCleanupService::new(repositories.tokens, TOKEN_CLEANUP_INTERVAL)).start_background_task();

    let outcome = server::run(&config.server, state).await;

    cleanup.abort();
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    pool.close().await;

    match outcome {
        Ok(()) => {
            info!("Server stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Shutdown did not complete cleanly");
            std::process::exit(1);
        }
    }
}
