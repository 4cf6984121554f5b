use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{AppResult, StoreError};
use crate::store::Measurement;

use super::ServerState;
use super::http::{RequestError, read_http_request, write_json_response};
use super::payload::{ErrorPayload, HealthPayload};
use super::routes::{Route, resolve_route};

pub(super) async fn handle_connection(
    mut socket: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState>,
) {
    let outcome = match read_http_request(&mut socket).await {
        Ok(request) => {
            debug!("{} {} from {}", request.method, request.target, peer);
            match resolve_route(&request.method, &request.target) {
                Ok(route) => respond(&mut socket, route, &state).await,
                Err(err) => write_request_error(&mut socket, &err).await,
            }
        }
        Err(err) => {
            debug!("Rejected request from {}: {}", peer, err.message);
            write_request_error(&mut socket, &err).await
        }
    };
    if let Err(err) = outcome {
        debug!("Failed to answer {}: {}", peer, err);
    }
}

async fn respond(socket: &mut TcpStream, route: Route, state: &Arc<ServerState>) -> AppResult<()> {
    match route {
        Route::Health => write_json_response(socket, 200, &HealthPayload { status: "ok" }).await,
        Route::Sites => write_json_response(socket, 200, &state.sites).await,
        Route::Data(site) => match lookup_site(state, site.clone()).await {
            Ok(rows) => write_json_response(socket, 200, &rows).await,
            Err(err) => {
                warn!("Lookup for '{}' failed: {}", site, err);
                write_store_error(socket, &err).await
            }
        },
        Route::Averages(granularity) => {
            let today = Local::now().date_naive();
            match state
                .store
                .averages(granularity, &state.sites, today)
                .await
            {
                Ok(averages) => write_json_response(socket, 200, &averages).await,
                Err(err) => {
                    warn!("{} averages failed: {}", granularity, err);
                    write_store_error(socket, &err).await
                }
            }
        }
    }
}

/// Runs the lookup on its own task. With `panic = "unwind"` (dev and test
/// profiles) a panic inside it still answers 500; the release profile
/// aborts instead.
async fn lookup_site(state: &Arc<ServerState>, site: String) -> Result<Vec<Measurement>, StoreError> {
    let store = state.store.clone();
    tokio::spawn(async move { store.recent_for_site(&site).await })
        .await
        .unwrap_or_else(|err| {
            Err(StoreError::Internal {
                context: "measurement lookup",
                details: err.to_string(),
            })
        })
}

async fn write_store_error(socket: &mut TcpStream, err: &StoreError) -> AppResult<()> {
    write_json_response(socket, 500, &ErrorPayload::from(err)).await
}

async fn write_request_error(socket: &mut TcpStream, err: &RequestError) -> AppResult<()> {
    write_json_response(socket, err.status, &ErrorPayload::message(err.message.clone())).await
}
