mod catalog;
mod gemini;
mod media;
mod models;
mod pdf;
mod progress;
mod render;
mod routes;
mod store;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use routes::{
    export_pdf, generate_storyboard, get_catalog, get_storyboard, reset_storyboard, AppState,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use crate::gemini::GeminiClient;
use crate::store::{FilePersistence, ProjectStore};

// Reference uploads are inlined into the request, so allow a few images.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let state_dir = std::env::var("VERTICALCINE_STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    let persistence = FilePersistence::new(&state_dir);
    tracing::info!("Project file: {:?}", persistence.path());

    let store = Arc::new(ProjectStore::new(Box::new(persistence)));
    store.restore().await;

    let state = AppState {
        store,
        gemini: Arc::new(GeminiClient::new()),
    };

    let app = Router::new()
        .route(
            "/api/storyboard",
            get(get_storyboard)
                .post(generate_storyboard)
                .delete(reset_storyboard),
        )
        .route("/api/storyboard/pdf", get(export_pdf))
        .route("/api/catalog", get(get_catalog))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Starting server");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
