use crate::config::ResolverConfig;
use crate::core::client::HttpLedgerClient;
use crate::core::walk::WalkSimulator;
use crate::domain::ports::LedgerApi;
use crate::utils::error::Result;
use crate::web::api::{self, AppState};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

async fn serve_index() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        DASHBOARD_HTML,
    )
}

pub fn build_router<A: LedgerApi + 'static>(state: AppState<A>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api::health))
        .route("/resolve", post(api::resolve::<A>))
        .route("/walk", post(api::walk::<A>));

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(serve_index))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: ResolverConfig, open_browser: bool) -> Result<()> {
    let client = HttpLedgerClient::new(config.api.clone());
    let state: AppState<HttpLedgerClient> =
        Arc::new(WalkSimulator::new(client, config.walk.clone()));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| crate::utils::error::ResolverError::InvalidConfigValueError {
            field: "server.host".to_string(),
            value: config.server.host.clone(),
            reason: format!("{}", e),
        })?;
    let url = format!("http://{}", addr);

    tracing::info!("🚀 Starting resolver dashboard at {}", url);
    tracing::info!("📡 Ledger API: {}", config.api.base_url);
    println!("Starting DualSubstrate Resolver dashboard at {url}");

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("⚠️ Could not open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
