use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{backup, sync};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Shared household token. `None` leaves the routes open, for a server
    /// only reachable from the local network.
    pub token: Option<Arc<str>>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = &state.token {
        let Some(TypedHeader(Authorization(bearer))) = auth_header else {
            return Err(StatusCode::UNAUTHORIZED);
        };
        if bearer.token() != expected.as_ref() {
            tracing::warn!("rejected request with a wrong bearer token");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/sync/pull", get(sync::pull))
        .route("/sync/push", post(sync::push))
        .route("/sync/status", get(sync::status))
        .route("/backup", get(backup::export).post(backup::import))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    token: Option<String>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(auth = token.is_some(), "Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        token: token.map(Arc::from),
    };

    axum::serve(listener, router(state)).await
}
