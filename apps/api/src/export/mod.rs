//! Report export: turns a rendered report region into a saved PDF.
//!
//! # Flow
//! 1. Validate inputs (nothing is composed for a missing region or name).
//! 2. `extracting`: the configured `ReportStrategy` composes pages, either by
//!    extracting text blocks and flowing them, or by rasterizing the region
//!    and slicing the capture into page bands.
//! 3. `generating`: footers are stamped, then the document is serialized
//!    inside `spawn_blocking`.
//! 4. `saving`: bytes go to a temp file in the destination directory that is
//!    renamed into place, so a failed export leaves nothing behind.
//! 5. `done`.

pub mod document;
pub mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::document::ReportDocument;
use crate::export::pdf::encode_pdf;
use crate::layout::{layout, slice, PageConfig};
use crate::raster::{CaptureOptions, PreCaptureHook, Rasterizer};
use crate::report::{extract_blocks, ContentRegion};

// ────────────────────────────────────────────────────────────────────────────
// Errors, progress, results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to generate PDF: {0}")]
    Precondition(String),

    #[error("Failed to generate PDF: {0}")]
    Rasterization(String),

    #[error("Failed to generate PDF: {0}")]
    Document(String),

    #[error("Failed to generate PDF: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Extracting,
    Generating,
    Saving,
    Done,
}

impl ExportStage {
    pub fn message(self) -> &'static str {
        match self {
            ExportStage::Extracting => "Extracting content...",
            ExportStage::Generating => "Generating PDF document...",
            ExportStage::Saving => "Saving PDF...",
            ExportStage::Done => "PDF downloaded successfully!",
        }
    }
}

/// Receives export milestones in order.
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: ExportStage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TextFlow,
    Raster,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "text_flow" => Ok(StrategyKind::TextFlow),
            "raster" | "image" => Ok(StrategyKind::Raster),
            other => Err(format!("unknown export strategy '{other}' (expected text or raster)")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub page_count: usize,
    pub strategy: StrategyKind,
    pub bytes_written: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────────────

/// Composes footer-less pages for a region.
#[async_trait]
pub trait ReportStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn compose(
        &self,
        region: &ContentRegion,
        page_config: &PageConfig,
    ) -> Result<ReportDocument, ExportError>;
}

/// Selectable text: extraction followed by text flow pagination.
pub struct TextFlowStrategy;

#[async_trait]
impl ReportStrategy for TextFlowStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextFlow
    }

    async fn compose(
        &self,
        region: &ContentRegion,
        page_config: &PageConfig,
    ) -> Result<ReportDocument, ExportError> {
        let blocks = extract_blocks(region);
        let pages = layout(&blocks, page_config);
        debug!(blocks = blocks.len(), pages = pages.len(), "Composed text flow pages");
        Ok(ReportDocument::from_text_layout(
            region.career_name(),
            *page_config,
            pages,
        ))
    }
}

/// Visual fidelity: one tall capture spread across page bands.
pub struct RasterStrategy {
    rasterizer: Arc<dyn Rasterizer>,
    hook: Arc<dyn PreCaptureHook>,
    options: CaptureOptions,
    /// Pause before capture so client-side animations finish.
    settle: Duration,
    timeout: Duration,
}

impl RasterStrategy {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        hook: Arc<dyn PreCaptureHook>,
        options: CaptureOptions,
        settle: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            rasterizer,
            hook,
            options,
            settle,
            timeout,
        }
    }
}

#[async_trait]
impl ReportStrategy for RasterStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Raster
    }

    async fn compose(
        &self,
        region: &ContentRegion,
        page_config: &PageConfig,
    ) -> Result<ReportDocument, ExportError> {
        tokio::time::sleep(self.settle).await;

        let capture = tokio::time::timeout(
            self.timeout,
            self.rasterizer
                .rasterize(region, &self.options, self.hook.as_ref()),
        )
        .await
        .map_err(|_| {
            warn!("Rasterization timed out after {} ms", self.timeout.as_millis());
            ExportError::Rasterization(format!(
                "capture timed out after {} ms",
                self.timeout.as_millis()
            ))
        })?
        .map_err(|e| ExportError::Rasterization(e.to_string()))?;

        let bands = slice(
            capture.width(),
            capture.height(),
            page_config.width_mm,
            page_config.height_mm,
        );
        if bands.is_empty() {
            return Err(ExportError::Rasterization(format!(
                "capture has no area ({}x{})",
                capture.width(),
                capture.height()
            )));
        }

        debug!(
            width = capture.width(),
            height = capture.height(),
            pages = bands.len(),
            "Sliced capture into page bands"
        );
        Ok(ReportDocument::from_raster(
            region.career_name(),
            *page_config,
            capture,
            &bands,
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Exporter
// ────────────────────────────────────────────────────────────────────────────

pub struct ReportExporter {
    strategy: Arc<dyn ReportStrategy>,
    page_config: PageConfig,
    export_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(
        strategy: Arc<dyn ReportStrategy>,
        page_config: PageConfig,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            strategy,
            page_config,
            export_dir: export_dir.into(),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Exports `region` to `{export_dir}/{filename}`.
    pub async fn export(
        &self,
        region: Option<&ContentRegion>,
        filename: &str,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ExportReport, ExportError> {
        let region = check_preconditions(region, filename)?;
        let notify = |stage: ExportStage| {
            info!("{}", stage.message());
            if let Some(sink) = progress {
                sink.report(stage);
            }
        };

        notify(ExportStage::Extracting);
        let mut document = self.strategy.compose(region, &self.page_config).await?;

        notify(ExportStage::Generating);
        document.stamp_footers();
        let page_count = document.page_count();
        let bytes = tokio::task::spawn_blocking(move || encode_pdf(document))
            .await
            .map_err(|e| ExportError::Document(format!("PDF encoder task failed: {e}")))?
            .map_err(|e| ExportError::Document(e.to_string()))?;

        notify(ExportStage::Saving);
        let dir = self.export_dir.clone();
        let name = filename.to_string();
        let bytes_written = bytes.len() as u64;
        let path = tokio::task::spawn_blocking(move || persist_atomically(&dir, &name, &bytes))
            .await
            .map_err(|e| ExportError::Persistence(format!("save task failed: {e}")))??;

        notify(ExportStage::Done);
        info!(
            path = %path.display(),
            pages = page_count,
            bytes = bytes_written,
            "Exported report"
        );

        Ok(ExportReport {
            path,
            page_count,
            strategy: self.strategy.kind(),
            bytes_written,
        })
    }
}

fn check_preconditions<'a>(
    region: Option<&'a ContentRegion>,
    filename: &str,
) -> Result<&'a ContentRegion, ExportError> {
    let region = region.ok_or_else(|| {
        ExportError::Precondition("Content element or career data not found".to_string())
    })?;
    if region.is_empty() || region.career_name().trim().is_empty() {
        return Err(ExportError::Precondition(
            "Content element or career data not found".to_string(),
        ));
    }
    if filename.trim().is_empty() {
        return Err(ExportError::Precondition("filename is empty".to_string()));
    }
    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        return Err(ExportError::Precondition(format!(
            "filename '{filename}' must not contain a path"
        )));
    }
    Ok(region)
}

/// Writes `bytes` to a temp file next to the destination, then renames it
/// over `dir/filename`.
fn persist_atomically(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let fail = |e: std::io::Error| {
        ExportError::Persistence(format!("could not save to {}: {e}", dir.display()))
    };

    std::fs::create_dir_all(dir).map_err(fail)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    temp.write_all(bytes).map_err(fail)?;
    temp.as_file().sync_all().map_err(fail)?;

    let path = dir.join(filename);
    temp.persist(&path).map_err(|e| fail(e.error))?;
    Ok(path)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
