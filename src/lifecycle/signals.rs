//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl+C) or SIGTERM
//! - Flip readiness, hold the listener open for the grace period, then shut down
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failed handler registration is logged and that signal is ignored

use std::time::Duration;

use crate::lifecycle::shutdown::Shutdown;

/// Wait until the process is asked to stop.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
    }
}

/// Drain then trigger `shutdown` once a signal arrives.
pub async fn shutdown_on_signal(shutdown: Shutdown, grace: Duration) {
    wait_for_signal().await;
    drain(shutdown, grace).await;
}

/// Report not-ready for `grace`, then stop the server.
pub async fn drain(shutdown: Shutdown, grace: Duration) {
    shutdown.begin_drain();
    if !grace.is_zero() {
        tracing::info!(grace_secs = grace.as_secs(), "Waiting before closing listener");
        tokio::time::sleep(grace).await;
    }
    shutdown.trigger();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::wait_for;

    #[tokio::test]
    async fn drain_flips_readiness_before_trigger() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();

        let task = tokio::spawn(drain(shutdown.clone(), Duration::from_millis(200)));
        while !shutdown.is_draining() {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        wait_for(rx).await;
        task.await.unwrap();
    }
}
