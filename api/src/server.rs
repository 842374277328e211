//! HTTP listener lifecycle
//!
//! actix's own signal handling is disabled. A watcher task waits for SIGINT or
//! SIGTERM, moves the coordinator to draining (new background work is refused
//! from then on) and stops the listener gracefully. The listener counts as one
//! unit until it has returned, after which the remaining background tasks get
//! `drain_timeout` to finish.

use actix_web::{web, HttpServer};
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use mq_core::services::ShutdownCoordinator;
use mq_shared::config::ServerConfig;

use crate::app::create_app;
use crate::state::AppState;

/// Serve until a stop signal, then drain
///
/// # Errors
/// Bind failures, listener errors, and `ShutdownTimeout` when background
/// tasks outlive the drain timeout
pub async fn run(config: &ServerConfig, state: web::Data<AppState>) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    let listener_guard = shutdown.register()?;

    let app_state = state.clone();
    let mut server = HttpServer::new(move || create_app(app_state.clone()))
        .keep_alive(Duration::from_secs(config.keep_alive))
        .shutdown_timeout(config.shutdown_timeout)
        .disable_signals();
    if config.workers > 0 {
        server = server.workers(config.workers);
    }

    let address = config.bind_address();
    let server = server.bind(&address)?.run();
    info!(address = %address, "Server listening");

    let handle = server.handle();
    let watcher = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.begin_drain();
            handle.stop(true).await;
        }
    });

    let served = server.await;
    drop(listener_guard);
    watcher.abort();

    finish(served, &shutdown, config.drain_timeout()).await
}

/// Drain background tasks after the listener returned, however it returned
///
/// A listener error is reported only once the drain is over, so queued mail
/// still goes out when the server fails.
async fn finish(
    served: std::io::Result<()>,
    shutdown: &ShutdownCoordinator,
    drain_timeout: Duration,
) -> anyhow::Result<()> {
    if let Err(e) = &served {
        error!(error = %e, "HTTP listener failed");
    }

    info!(
        outstanding = shutdown.outstanding(),
        "HTTP listener stopped, waiting for background tasks"
    );
    let drained = shutdown.drain(drain_timeout).await;

    served?;
    drained?;
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mq_core::services::ShutdownPhase;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_listener_error_still_drains_background_tasks() {
        let shutdown = ShutdownCoordinator::new();
        let delivered = Arc::new(AtomicBool::new(false));
        shutdown
            .track("send_mail", {
                let delivered = Arc::clone(&delivered);
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    delivered.store(true, Ordering::SeqCst);
                }
            })
            .unwrap();

        let outcome = finish(
            Err(io::Error::new(io::ErrorKind::Other, "listener crashed")),
            &shutdown,
            Duration::from_secs(5),
        )
        .await;

        assert!(outcome.unwrap_err().to_string().contains("listener crashed"));
        assert!(delivered.load(Ordering::SeqCst));
        assert_eq!(shutdown.phase(), ShutdownPhase::Stopped);
    }

    #[actix_web::test]
    async fn test_clean_stop_with_nothing_outstanding() {
        let shutdown = ShutdownCoordinator::new();
        assert!(finish(Ok(()), &shutdown, Duration::from_secs(1)).await.is_ok());
        assert_eq!(shutdown.outstanding(), 0);
    }
}
