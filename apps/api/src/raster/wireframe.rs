//! Headless wireframe rasterizer.
//!
//! Paints the report as a block wireframe: headings become accent bars, text
//! becomes grey line bars wrapped to the surface width, skill pills become
//! rounded tiles, and the skills chart becomes a pie of matched vs to-learn.
//! Elements still hidden after the pre-capture hook capture as empty space.
//!
//! Painting is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::raster::{
    style_hides, CaptureOptions, CaptureTarget, PreCaptureHook, RasterError, RasterImage,
    Rasterizer,
};
use crate::report::ContentRegion;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const ACCENT: Rgb<u8> = Rgb([6, 182, 212]);
const INK: Rgb<u8> = Rgb([51, 65, 85]);
const MUTED: Rgb<u8> = Rgb([203, 213, 225]);
const PILL: Rgb<u8> = Rgb([224, 242, 254]);
const TO_LEARN: Rgb<u8> = Rgb([71, 85, 105]);

// All geometry below is in CSS pixels; the capture scale is applied at paint time.
const PADDING: f32 = 32.0;
const CHAR_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 20.0;
const CHART_SIZE: f32 = 240.0;

/// One painted primitive in CSS pixel space.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Bar {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb<u8>,
    },
    Pie {
        cx: f32,
        cy: f32,
        r: f32,
        matched_fraction: f32,
    },
}

#[derive(Debug, Default, Clone)]
pub struct WireframeRasterizer;

impl WireframeRasterizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Rasterizer for WireframeRasterizer {
    async fn rasterize(
        &self,
        region: &ContentRegion,
        options: &CaptureOptions,
        hook: &dyn PreCaptureHook,
    ) -> Result<RasterImage, RasterError> {
        if region.is_empty() {
            return Err(RasterError::EmptyTarget);
        }

        let mut target = CaptureTarget::from_region(region);
        hook.prepare(&mut target);

        let options = options.clone();
        tokio::task::spawn_blocking(move || paint(&target, &options))
            .await
            .map_err(|e| RasterError::Worker(e.to_string()))?
    }
}

/// Lays out and paints the capture target synchronously.
fn paint(target: &CaptureTarget, options: &CaptureOptions) -> Result<RasterImage, RasterError> {
    if options.width_px == 0 || !(options.scale > 0.0) {
        return Err(RasterError::Capture(format!(
            "invalid surface {}px at scale {}",
            options.width_px, options.scale
        )));
    }

    let (shapes, content_height) = lay_out(target.html(), options.width_px as f32)?;

    let width = (options.width_px as f32 * options.scale).round() as u32;
    let height = ((content_height * options.scale).ceil() as u32).max(1);
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for shape in &shapes {
        draw(&mut canvas, shape, options.scale);
    }

    // No external images are referenced, so the image wait bound never applies.
    debug!(
        "Wireframe capture: {} shapes on {}x{} px (image wait {} ms unused)",
        shapes.len(),
        width,
        height,
        options.image_wait.as_millis()
    );
    Ok(RasterImage::new(canvas))
}

/// Walks the markup in document order and stacks one shape group per element.
/// Returns the shapes and the total content height.
fn lay_out(html: &str, surface_width: f32) -> Result<(Vec<Shape>, f32), RasterError> {
    let selector =
        Selector::parse("h1, h2, h3, p, li, span.rounded-full, canvas, .no-data > span").map_err(|e| RasterError::Capture(format!("selector: {e}")))?;
    let document = Html::parse_fragment(html);

    let inner_width = (surface_width - 2.0 * PADDING).max(CHAR_WIDTH);
    let chars_per_line = ((inner_width / CHAR_WIDTH).floor() as usize).max(1);

    let mut shapes = Vec::new();
    let mut y = PADDING;
    let mut pill_x = PADDING;
    let mut in_pill_row = false;

    for element in document.select(&selector) {
        let tag = element.value().name();
        let is_pill = tag == "span" && element.value().classes().any(|c| c == "rounded-full");

        if !is_pill && in_pill_row {
            y += 28.0 + 12.0;
            in_pill_row = false;
        }

        match tag {
            "h1" | "h2" | "h3" => {
                let (h, advance, char_w) = match tag {
                    "h1" => (32.0, 52.0, 18.0),
                    "h2" => (22.0, 38.0, 12.0),
                    _ => (16.0, 28.0, 10.0),
                };
                let chars = text_len(&element) as f32;
                shapes.push(Shape::Bar {
                    x: PADDING,
                    y,
                    w: (chars * char_w).clamp(char_w, inner_width),
                    h,
                    color: ACCENT,
                });
                y += advance;
            }
            "canvas" => {
                if is_visible(&element) {
                    shapes.push(Shape::Pie {
                        cx: PADDING + CHART_SIZE / 2.0,
                        cy: y + CHART_SIZE / 2.0,
                        r: CHART_SIZE / 2.0,
                        matched_fraction: matched_fraction(&element),
                    });
                }
                y += CHART_SIZE + 20.0;
            }
            _ if is_pill => {
                let w = text_len(&element) as f32 * CHAR_WIDTH + 24.0;
                if in_pill_row && pill_x + w > PADDING + inner_width {
                    y += 28.0 + 8.0;
                    pill_x = PADDING;
                }
                if !in_pill_row {
                    pill_x = PADDING;
                    in_pill_row = true;
                }
                shapes.push(Shape::Bar {
                    x: pill_x,
                    y,
                    w: w.min(inner_width),
                    h: 28.0,
                    color: PILL,
                });
                pill_x += w + 8.0;
            }
            _ => {
                let chars = text_len(&element);
                let lines = chars.div_ceil(chars_per_line).max(1);
                for line in 0..lines {
                    let remaining = chars - (line * chars_per_line).min(chars);
                    let line_chars = remaining.min(chars_per_line).max(1);
                    shapes.push(Shape::Bar {
                        x: PADDING,
                        y: y + 5.0,
                        w: line_chars as f32 * CHAR_WIDTH,
                        h: 10.0,
                        color: if tag == "p" { INK } else { MUTED },
                    });
                    y += LINE_HEIGHT;
                }
                y += 6.0;
            }
        }
    }

    if in_pill_row {
        y += 28.0 + 12.0;
    }

    Ok((shapes, y + PADDING))
}

fn text_len(element: &ElementRef<'_>) -> usize {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .count()
}

fn is_visible(element: &ElementRef<'_>) -> bool {
    !element.value().attr("style").is_some_and(style_hides)
}

fn matched_fraction(element: &ElementRef<'_>) -> f32 {
    let read = |name: &str| {
        element
            .value()
            .attr(name)
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(0.0)
    };
    let matched = read("data-matched");
    let total = matched + read("data-to-learn");
    if total > 0.0 {
        matched / total
    } else {
        0.0
    }
}

fn draw(canvas: &mut RgbImage, shape: &Shape, scale: f32) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    match *shape {
        Shape::Bar { x, y, w, h, color } => {
            let x0 = ((x * scale) as i64).clamp(0, cw);
            let y0 = ((y * scale) as i64).clamp(0, ch);
            let x1 = (((x + w) * scale) as i64).clamp(0, cw);
            let y1 = (((y + h) * scale) as i64).clamp(0, ch);
            for py in y0..y1 {
                for px in x0..x1 {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
        Shape::Pie {
            cx,
            cy,
            r,
            matched_fraction,
        } => {
            let (cx, cy, r) = (cx * scale, cy * scale, r * scale);
            let x0 = ((cx - r) as i64).clamp(0, cw);
            let x1 = ((cx + r).ceil() as i64).clamp(0, cw);
            let y0 = ((cy - r) as i64).clamp(0, ch);
            let y1 = ((cy + r).ceil() as i64).clamp(0, ch);
            let sweep = matched_fraction * std::f32::consts::TAU;
            for py in y0..y1 {
                for px in x0..x1 {
                    let dx = px as f32 + 0.5 - cx;
                    let dy = py as f32 + 0.5 - cy;
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    // Clockwise from twelve o'clock.
                    let angle = dx.atan2(-dy).rem_euclid(std::f32::consts::TAU);
                    let color = if angle < sweep { ACCENT } else { TO_LEARN };
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{ForceVisibility, NoopHook};

    const CHART: &str = r#"<div id="report-content" class="space-y-8"><div class="card"><h1>Data Scientist</h1><p>Turns data into decisions.</p></div><div class="card"><h2>Skills Analysis</h2><canvas class="skills-chart" data-matched="2" data-to-learn="1" style="opacity:0"></canvas></div></div>"#;

    fn count_color(image: &RasterImage, color: Rgb<u8>) -> usize {
        image.pixels().pixels().filter(|p| **p == color).count()
    }

    #[tokio::test]
    async fn test_capture_width_follows_scale() {
        let region = ContentRegion::new(CHART, "Data Scientist");
        let options = CaptureOptions {
            scale: 2.0,
            ..CaptureOptions::default()
        };
        let image = WireframeRasterizer
            .rasterize(&region, &options, &NoopHook)
            .await
            .unwrap();

        assert_eq!(image.width(), 794 * 2);
        assert!(image.height() > 0);
    }

    #[tokio::test]
    async fn test_hidden_chart_paints_only_after_hook() {
        let region = ContentRegion::new(CHART, "Data Scientist");
        let options = CaptureOptions::default();

        let hidden = WireframeRasterizer
            .rasterize(&region, &options, &NoopHook)
            .await
            .unwrap();
        let revealed = WireframeRasterizer
            .rasterize(&region, &options, &ForceVisibility)
            .await
            .unwrap();

        assert_eq!(count_color(&hidden, TO_LEARN), 0);
        assert!(count_color(&revealed, TO_LEARN) > 0);
        // Same layout either way; hidden content still occupies its space.
        assert_eq!(hidden.height(), revealed.height());
    }

    #[tokio::test]
    async fn test_spaced_opacity_chart_paints_after_hook() {
        let region = ContentRegion::new(CHART.replace("opacity:0", "opacity: 0"), "Data Scientist");
        let options = CaptureOptions::default();

        let hidden = WireframeRasterizer
            .rasterize(&region, &options, &NoopHook)
            .await
            .unwrap();
        let revealed = WireframeRasterizer
            .rasterize(&region, &options, &ForceVisibility)
            .await
            .unwrap();

        assert_eq!(count_color(&hidden, TO_LEARN), 0);
        assert!(count_color(&revealed, TO_LEARN) > 0);
    }

    #[tokio::test]
    async fn test_empty_region_is_rejected() {
        let region = ContentRegion::new("   ", "X");
        let result = WireframeRasterizer
            .rasterize(&region, &CaptureOptions::default(), &NoopHook)
            .await;
        assert!(matches!(result, Err(RasterError::EmptyTarget)));
    }

    #[test]
    fn test_long_paragraph_wraps_into_more_height() {
        let short = lay_out("<p>short</p>", 794.0).unwrap().1;
        let long = lay_out(&format!("<p>{}</p>", "word ".repeat(200)), 794.0).unwrap().1;
        assert!(long > short);
    }

    #[test]
    fn test_zero_width_surface_fails() {
        let target = CaptureTarget::from_region(&ContentRegion::new("<p>x</p>", "X"));
        let options = CaptureOptions {
            width_px: 0,
            ..CaptureOptions::default()
        };
        assert!(matches!(paint(&target, &options), Err(RasterError::Capture(_))));
    }
}
