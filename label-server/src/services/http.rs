use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::printers::router())
        .merge(crate::api::print::router())
        .merge(crate::api::batch::router())
        .merge(crate::api::template::router())
}

/// Build the complete router with state and middleware
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}

/// Serve `app` on `addr` until `shutdown_signal` resolves
///
/// After the signal, in-flight requests (including open batch streams) get
/// `grace` to finish before connections are dropped.
pub async fn serve<F>(
    app: Router,
    addr: SocketAddr,
    shutdown_signal: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("🚀 Starting HTTP server on {}", addr);

    let handle = axum_server::Handle::new();

    // Handle shutdown signal
    let handle_clone = handle.clone();
    tokio::spawn(async move {
        shutdown_signal.await;
        handle_clone.graceful_shutdown(Some(grace));
    });

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
}
