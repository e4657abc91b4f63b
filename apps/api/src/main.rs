mod config;
mod errors;
mod export;
mod layout;
mod matching;
mod models;
mod raster;
mod recommender;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::export::{RasterStrategy, ReportExporter, ReportStrategy, StrategyKind, TextFlowStrategy};
use crate::layout::default_page_config;
use crate::matching::ContainmentMatcher;
use crate::raster::{CaptureOptions, ForceVisibility, WireframeRasterizer};
use crate::recommender::RecommenderClient;
use crate::report::ReportRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize recommender client
    let recommender = RecommenderClient::new(config.recommender_url.clone())?;
    info!("Recommender client initialized ({})", config.recommender_url);

    // Containment matching by default; the renderer takes any SkillMatcher
    let renderer = Arc::new(ReportRenderer::new(Arc::new(ContainmentMatcher)));

    let page_config = default_page_config();
    let strategy: Arc<dyn ReportStrategy> = match config.export_strategy {
        StrategyKind::TextFlow => Arc::new(TextFlowStrategy),
        StrategyKind::Raster => {
            let options = CaptureOptions {
                scale: config.raster_scale,
                image_wait: config.raster_timeout,
                ..CaptureOptions::default()
            };
            Arc::new(RasterStrategy::new(
                Arc::new(WireframeRasterizer::new()),
                Arc::new(ForceVisibility),
                options,
                config.raster_settle,
                config.raster_timeout,
            ))
        }
    };
    let exporter = Arc::new(ReportExporter::new(
        strategy,
        page_config,
        config.export_dir.clone(),
    ));
    info!(
        "Export strategy: {:?} on {}x{} mm pages, writing to {}",
        exporter.strategy(),
        page_config.width_mm,
        page_config.height_mm,
        config.export_dir.display()
    );

    // Build app state
    let state = AppState {
        recommender,
        renderer,
        exporter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the frontend host once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
