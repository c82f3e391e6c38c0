pub mod error;
pub mod routes;
pub mod state;
pub mod worker;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;
pub use worker::WorkerPool;

/// Build the axum Router with all report routes and middleware.
/// Used by `serve_on()` and by the integration tests.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/trigger_report", post(routes::reports::trigger_report))
        .route(
            "/get_report/{report_id}",
            get(routes::reports::get_report),
        )
        .route("/reports", get(routes::reports::list_reports))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the report server on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("uptime report server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
