use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;

use crate::session;
use crate::stats::ProxyStats;

// Does not kill sessions already spawned when shutdown fires.
pub async fn run(listener: TcpListener, stats: Arc<ProxyStats>, shutdown: impl std::future::Future<Output = ()>) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("shutdown signal received, no longer accepting new connections");
                break;
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!("accepted connection from {peer}");
                        let stats = Arc::clone(&stats);
                        tokio::spawn(async move {
                            session::run(stream, stats).await;
                        });
                    }
                    Err(e) => {
                        warn!("accept failed: {e}");
                    }
                }
            }
        }
    }
}

// Resolves on Ctrl-C or, on Unix, SIGTERM, whichever arrives first.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let ctrl_c = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                ctrl_c.await;
                return;
            }
        };
        let terminate = async {
            terminate.recv().await;
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
