pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all page and API routes plus middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    router(state::AppState::new(root))
}

/// Build the Router around an existing state, e.g. one with a custom config.
pub fn router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Wizard pages
        .route("/", get(routes::pages::page))
        .route("/step1", get(routes::pages::page))
        .route("/step2", get(routes::pages::page))
        .route("/step3", get(routes::pages::page))
        .route("/summary", get(routes::pages::page))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // State
        .route("/api/state", get(routes::state::get_state))
        // Steps
        .route("/api/steps/{step}/draft", put(routes::steps::save_draft))
        .route("/api/steps/{step}/submit", post(routes::steps::submit_step))
        // Navigation
        .route(
            "/api/navigation/{action}",
            post(routes::navigation::navigate),
        )
        .route("/api/reset", post(routes::navigation::start_new_application))
        // Assistant
        .route("/api/assist", post(routes::assist::suggest))
        .route("/health", get(routes::state::health))
        .fallback(routes::pages::page)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the wizard server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the wizard server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("wizard server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
