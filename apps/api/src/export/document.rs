//! Page model shared by both export strategies.
//!
//! A strategy produces a `ReportDocument` (a list of pages holding draw
//! operations in page millimetres); the footer pass then stamps every page,
//! and the PDF writer serializes the result.

use crate::layout::{FontFace, ImagePage, PageConfig, PageLayout, Rgb, TextRun};
use crate::raster::RasterImage;

pub const FOOTER_SIZE_PT: f32 = 10.0;
pub const FOOTER_COLOR: Rgb = Rgb(128, 128, 128);
/// Footer baseline anchor, measured from the right and bottom page edges.
pub const FOOTER_INSET_X_MM: f32 = 40.0;
pub const FOOTER_INSET_Y_MM: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    /// Places the document's shared capture with its top-left corner at
    /// (`x_mm`, `y_mm`); `y_mm` may be negative.
    Image {
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPage {
    pub ops: Vec<DrawOp>,
}

impl DocumentPage {
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            DrawOp::Image { .. } => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub page_config: PageConfig,
    pub pages: Vec<DocumentPage>,
    /// Capture referenced by every `DrawOp::Image`; embedded once.
    pub image: Option<RasterImage>,
}

impl ReportDocument {
    pub fn from_text_layout(
        title: impl Into<String>,
        page_config: PageConfig,
        layouts: Vec<PageLayout>,
    ) -> Self {
        let pages = layouts
            .into_iter()
            .map(|layout| DocumentPage {
                ops: layout.runs.into_iter().map(DrawOp::Text).collect(),
            })
            .collect();

        Self {
            title: title.into(),
            page_config,
            pages,
            image: None,
        }
    }

    pub fn from_raster(
        title: impl Into<String>,
        page_config: PageConfig,
        image: RasterImage,
        bands: &[ImagePage],
    ) -> Self {
        let pages = bands
            .iter()
            .map(|band| DocumentPage {
                ops: vec![DrawOp::Image {
                    x_mm: 0.0,
                    y_mm: band.offset_y,
                    width_mm: band.width,
                    height_mm: band.height,
                }],
            })
            .collect();

        Self {
            title: title.into(),
            page_config,
            pages,
            image: Some(image),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends "Page i of N" to every page. Runs once, after layout, when the
    /// total page count is known.
    pub fn stamp_footers(&mut self) {
        let total = self.pages.len();
        let x = self.page_config.width_mm - FOOTER_INSET_X_MM;
        let baseline = self.page_config.height_mm - FOOTER_INSET_Y_MM;

        for (i, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(DrawOp::Text(TextRun::at_baseline(
                footer_text(i + 1, total),
                x,
                baseline,
                FontFace::Helvetica,
                FOOTER_SIZE_PT,
                FOOTER_COLOR,
            )));
        }
    }
}

pub fn footer_text(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}
