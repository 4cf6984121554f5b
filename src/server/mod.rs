//! Read-only HTTP query service over the measurement store.
mod handler;
mod http;
mod payload;
mod routes;


use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::args::{ServeArgs, default_sites};
use crate::error::{AppError, AppResult, HttpError};
use crate::shutdown::{
    ShutdownReceiver, ShutdownSender, setup_signal_shutdown_handler, shutdown_channel,
};
use crate::store::MeasurementStore;

pub use payload::ErrorPayload;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub store: MeasurementStore,
    /// Sites listed by `/api/sites` and aggregated by `/api/averages`.
    pub sites: Vec<String>,
}

impl ServerConfig {
    #[must_use]
    pub fn from_args(args: &ServeArgs) -> Self {
        let sites = if args.sites.is_empty() {
            default_sites()
        } else {
            args.sites.clone()
        };
        Self {
            listen: args.listen,
            store: MeasurementStore::new(PathBuf::from(&args.db_path), args.limit),
            sites,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ServerState {
    store: MeasurementStore,
    sites: Vec<String>,
}

/// A bound server accepting connections on a background task.
#[derive(Debug)]
pub struct RunningServer {
    addr: SocketAddr,
    shutdown_tx: ShutdownSender,
    handle: JoinHandle<()>,
}

impl RunningServer {
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits until the accept loop exits.
    ///
    /// # Errors
    ///
    /// Returns an error when the accept task panicked.
    pub async fn wait(self) -> AppResult<()> {
        self.handle.await.map_err(AppError::from)
    }

    /// Broadcasts shutdown and waits for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// Returns an error when the accept task panicked.
    pub async fn stop(self) -> AppResult<()> {
        drop(self.shutdown_tx.send(()));
        self.wait().await
    }
}

/// Binds the listener and starts accepting connections. The loop stops when
/// `shutdown_tx` broadcasts.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn spawn_server(
    config: ServerConfig,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunningServer> {
    let listener = TcpListener::bind(config.listen).await.map_err(|err| {
        AppError::http(HttpError::Bind {
            addr: config.listen,
            source: err,
        })
    })?;
    let addr = listener.local_addr().map_err(|err| {
        AppError::http(HttpError::Io {
            context: "read listener address",
            source: err,
        })
    })?;
    info!(
        "Serving {} on http://{} ({} monitored sites, limit {})",
        config.store.db_path().display(),
        addr,
        config.sites.len(),
        config.store.limit()
    );

    let state = Arc::new(ServerState {
        store: config.store,
        sites: config.sites,
    });
    let handle = tokio::spawn(accept_connections(listener, state, shutdown_tx.subscribe()));
    Ok(RunningServer {
        addr,
        shutdown_tx: shutdown_tx.clone(),
        handle,
    })
}

/// Serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error when the server cannot start.
pub async fn run_server(config: ServerConfig) -> AppResult<()> {
    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let server = spawn_server(config, &shutdown_tx).await?;
    server.wait().await?;
    signal_handle.await?;
    Ok(())
}

async fn accept_connections(
    listener: TcpListener,
    state: Arc<ServerState>,
    mut shutdown_rx: ShutdownReceiver,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Query service stopped");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(handler::handle_connection(socket, peer, state));
                }
                Err(err) => warn!("Failed to accept connection: {}", err),
            }
        }
    }
}
