// Page layout for exported reports.
// Helvetica metric tables plus the two paginators (text flow and raster bands).
// Everything here is pure and synchronous; the exporter decides where it runs.

pub mod font_metrics;
pub mod raster_slice;
pub mod text_flow;

// Re-export the public API consumed by the export strategies.
pub use font_metrics::{default_page_config, FontFace, PageConfig};
pub use raster_slice::{slice, ImagePage};
pub use text_flow::{layout, PageLayout, Rgb, TextRun};
