use crate::{create_router, AppState};
use std::io;
use tasklens_core::{Result, Settings};
use tokio::signal;
use tracing::{info, warn};

pub struct Server {
    state: AppState,
    host: String,
    port: u16,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        crate::metrics::register_metrics();
        let host = settings.server.host.clone();
        let port = settings.server.port;
        Self {
            state: AppState::new(settings),
            host,
            port,
        }
    }

    pub async fn run(self) -> Result<()> {
        let addr = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("could not resolve {}:{}", self.host, self.port),
                )
            })?;

        let router = create_router(self.state);

        let listener = {
            let socket = if addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }?;

            // Rebind quickly after a restart
            let _ = socket.set_reuseaddr(true);
            let _ = socket.set_keepalive(true);

            socket.bind(addr)?;
            socket.listen(1024)?
        };

        info!("TaskLens API listening on http://{}", addr);
        info!("  GET    /tasks, POST /tasks, PUT|DELETE /tasks/{{id}}");
        info!("  GET    /contexts, POST /contexts, POST /contexts/{{id}}/process");
        info!("  GET    /ai/suggestions, /ai/insights");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
