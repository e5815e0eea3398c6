/// Vision overlay service.
///
/// Accepts uploads, runs them through the annotation API and returns
/// overlay geometry and thumbnails ready to draw.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vision_overlay::config::Config;
use vision_overlay::error::AppError;
use vision_overlay::handlers::{router, AppState};

fn main() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vision_overlay=info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    eprintln!("[STARTUP] Vision overlay service starting...");

    // Thumbnail encoding and decoding go to the blocking pool
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build runtime: {e}")))?;

    eprintln!("[STARTUP] Tokio runtime configured: {} worker threads", num_cpus::get());

    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), AppError> {
    let config = Config::from_env();
    eprintln!("[STARTUP] Config loaded");
    info!("Vision API URL: {}", config.vision_api_url);
    info!("Port: {}", config.port);
    info!(
        "Thumbnails: {}px at quality {}",
        config.thumbnail_size, config.thumbnail_quality
    );
    info!(
        "Sessions: up to {} kept, {}s idle TTL",
        config.session_capacity, config.session_ttl_secs
    );
    if config.vision_api_key.is_none() && config.vision_access_token.is_none() {
        tracing::warn!("No VISION_API_KEY or VISION_ACCESS_TOKEN set; requests will be unauthenticated");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    eprintln!("[STARTUP] Binding to {}...", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    eprintln!("[STARTUP] Server ready! Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    eprintln!("[SHUTDOWN] Server stopped");
    Ok(())
}
