//! Raster Pagination: spreads one tall capture across page-height bands.
//!
//! The image is never cut. Every page places the same full image, shifted up
//! by one page height per page, and the viewer's page clipping exposes a
//! different band on each page.

use serde::{Deserialize, Serialize};

/// Float slack so an image of exactly N page heights yields N pages, not N + 1.
const HEIGHT_TOLERANCE_MM: f32 = 1e-3;

/// Placement of the full capture on one page, in page units (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePage {
    /// 1-based page number.
    pub index: usize,
    /// Vertical offset of the image's top edge; `0` on page 1, negative afterwards.
    pub offset_y: f32,
    pub width: f32,
    /// Height of the image once scaled to the page width.
    pub height: f32,
}

/// Computes the bands for an `image_width` × `image_height` pixel capture.
///
/// Returns no pages for a degenerate image or page; callers treat that as a
/// failed capture.
pub fn slice(
    image_width: u32,
    image_height: u32,
    page_width: f32,
    page_height: f32,
) -> Vec<ImagePage> {
    if image_width == 0 || image_height == 0 || page_width <= 0.0 || page_height <= 0.0 {
        return Vec::new();
    }

    let scaled_height = image_height as f32 * page_width / image_width as f32;
    let mut pages = vec![ImagePage {
        index: 1,
        offset_y: 0.0,
        width: page_width,
        height: scaled_height,
    }];

    loop {
        let emitted = pages.len() as f32;
        let remaining = scaled_height - page_height * emitted;
        if remaining <= HEIGHT_TOLERANCE_MM {
            break;
        }
        pages.push(ImagePage {
            index: pages.len() + 1,
            offset_y: -(emitted * page_height),
            width: page_width,
            height: scaled_height,
        });
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_W: f32 = 210.0;
    const PAGE_H: f32 = 297.0;

    #[test]
    fn test_exactly_two_page_heights_yields_two_pages() {
        // 420 px wide → scale 0.5 mm/px; 1188 px tall → 594 mm = 2 × 297.
        let pages = slice(420, 1188, PAGE_W, PAGE_H);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].offset_y, 0.0);
        assert_eq!(pages[1].offset_y, -PAGE_H);
        assert!((pages[0].height - 594.0).abs() < 1e-3);
    }

    #[test]
    fn test_short_image_yields_one_page() {
        assert_eq!(slice(420, 300, PAGE_W, PAGE_H).len(), 1);
        // Exactly one page height.
        assert_eq!(slice(420, 594, PAGE_W, PAGE_H).len(), 1);
    }

    #[test]
    fn test_partial_last_band_gets_its_own_page() {
        let pages = slice(420, 1200, PAGE_W, PAGE_H);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].index, 3);
        assert_eq!(pages[2].offset_y, -2.0 * PAGE_H);
    }

    #[test]
    fn test_scale_factor_does_not_change_page_count() {
        // A 2× capture of the same surface has the same aspect ratio.
        assert_eq!(
            slice(794, 2500, PAGE_W, PAGE_H).len(),
            slice(1588, 5000, PAGE_W, PAGE_H).len()
        );
    }

    #[test]
    fn test_degenerate_inputs_yield_no_pages() {
        assert!(slice(0, 100, PAGE_W, PAGE_H).is_empty());
        assert!(slice(100, 0, PAGE_W, PAGE_H).is_empty());
        assert!(slice(100, 100, PAGE_W, 0.0).is_empty());
    }
}
