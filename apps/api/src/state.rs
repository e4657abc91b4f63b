use std::sync::Arc;

use crate::export::ReportExporter;
use crate::recommender::RecommenderClient;
use crate::report::ReportRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub recommender: RecommenderClient,
    /// Renders recommendations; carries the pluggable skill matcher.
    pub renderer: Arc<ReportRenderer>,
    /// Exporter built for the configured strategy (text flow or raster).
    pub exporter: Arc<ReportExporter>,
}
