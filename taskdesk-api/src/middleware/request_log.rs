/// API request logging
///
/// Emits one event per `/api` request on the `api_activity` target with the
/// method, URI, user ID (`guest` when unauthenticated), client IP and
/// response status. The user is read from the response extensions, where the
/// authentication layer leaves the [`AuthContext`].
///
/// Filter these events alone with `RUST_LOG=api_activity=info`.

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use taskdesk_shared::auth::middleware::AuthContext;

/// Tracing target for request events
pub const TARGET: &str = "api_activity";

const GUEST: &str = "guest";

/// Request logging middleware, for `axum::middleware::from_fn`
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let ip = client_ip(req.headers(), req.extensions().get::<ConnectInfo<SocketAddr>>());

    let response = next.run(req).await;

    let user = response
        .extensions()
        .get::<AuthContext>()
        .map(|auth| auth.user_id().to_string())
        .unwrap_or_else(|| GUEST.to_string());

    tracing::info!(
        target: TARGET,
        method = %method,
        uri = %uri,
        user = %user,
        ip = %ip,
        status = response.status().as_u16(),
        "API request"
    );

    response
}

/// Client address: first `X-Forwarded-For` hop, else the peer address
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
