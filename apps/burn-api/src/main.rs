//! Burn API Server
//!
//! HTTP front end for the field burner. Provides REST endpoints for:
//!
//! - Burning form fields into a PDF (`POST /api/sign-pdf`)
//! - Fetching burned PDFs (`GET /files/{name}`)
//! - Reading a document's audit trail (`GET /api/audit/{documentId}`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod audit;
mod config;
mod error;
mod handlers;
mod models;
mod state;
mod storage;
#[cfg(test)]
mod tests;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let mut filter = EnvFilter::from_default_env()
        .add_directive("burn_api=info".parse()?)
        .add_directive("field_burner=info".parse()?)
        .add_directive("tower_http=debug".parse()?);
    if config.verbose {
        filter = filter.add_directive(Level::DEBUG.into());
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing burn API...");
    let state = Arc::new(AppState::new(&config).await?);

    let app = router(state, config.body_limit_bytes()).layer(cors_layer(&config.allowed_origins()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Burn API listening on http://{}", addr);
    info!("Storing signed PDFs in {}", config.storage_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes and request middleware, without CORS
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Burning
        .route("/api/sign-pdf", post(handlers::sign_pdf))
        .route("/api/audit/:document_id", get(handlers::get_audit_trail))
        // Stored output
        .route("/files/:name", get(handlers::get_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow-list CORS, or any origin when the list is empty
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}
