// On-screen report: HTML rendering of a recommendation and structured extraction from it.
// The exporter only ever sees the rendered `ContentRegion`, never the model itself.

pub mod extractor;
pub mod handlers;
pub mod region;
pub mod render;

pub use extractor::{extract_blocks, BlockKind, ContentBlock};
pub use region::ContentRegion;
pub use render::ReportRenderer;
