//! Rasterization capability used by the image-based export.
//!
//! The exporter treats rasterization as an external service: it hands over the
//! rendered region, capture options, and a pre-capture hook, and gets back one
//! tall image of the whole report. `WireframeRasterizer` is the bundled headless
//! implementation.

pub mod wireframe;

use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

use crate::report::ContentRegion;

pub use wireframe::WireframeRasterizer;

/// CSS pixel width of an A4 page at 96 dpi.
pub const A4_WIDTH_PX: u32 = 794;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("capture target is empty")]
    EmptyTarget,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("rasterizer worker failed: {0}")]
    Worker(String),
}

/// How the surface is captured.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Layout width of the surface in CSS pixels (equal to the page width).
    pub width_px: u32,
    /// Uniform magnification applied before capture for sharper output.
    pub scale: f32,
    /// Upper bound on waiting for image resources; capture proceeds with whatever loaded.
    pub image_wait: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width_px: A4_WIDTH_PX,
            scale: 2.0,
            image_wait: Duration::from_secs(15),
        }
    }
}

/// One tall capture of the full report.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Packed 8-bit RGB samples, row-major.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels.into_raw()
    }
}

/// Private copy of the region markup that a pre-capture hook may rewrite.
/// The caller's region is never touched.
#[derive(Debug, Clone)]
pub struct CaptureTarget {
    html: String,
}

impl CaptureTarget {
    pub fn from_region(region: &ContentRegion) -> Self {
        Self {
            html: region.html().to_string(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Rewrites inline `opacity:0` / `visibility:hidden` on every opening tag
    /// of the given element names so the capture paints them.
    pub fn force_visible(&mut self, tags: &[&str]) {
        let mut out = String::with_capacity(self.html.len());
        let mut rest = self.html.as_str();

        while let Some(start) = rest.find('<') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let end = tail.find('>').map(|i| i + 1).unwrap_or(tail.len());
            let tag = &tail[..end];
            if opens_any(tag, tags) {
                out.push_str(&reveal(tag));
            } else {
                out.push_str(tag);
            }
            rest = &tail[end..];
        }
        out.push_str(rest);
        self.html = out;
    }
}

fn opens_any(tag: &str, names: &[&str]) -> bool {
    let name: String = tag[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    names.iter().any(|n| n.eq_ignore_ascii_case(&name))
}

/// Rewrites the quoted `style` attribute of one opening tag, if it has one.
fn reveal(tag: &str) -> String {
    let lower = tag.to_ascii_lowercase();
    let Some((attr, _)) = lower
        .match_indices("style=")
        .find(|(i, _)| lower[..*i].ends_with(|c: char| c.is_ascii_whitespace()))
    else {
        return tag.to_string();
    };

    let value_start = attr + "style=".len();
    let Some(quote) = tag[value_start..]
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
    else {
        return tag.to_string();
    };
    let body_start = value_start + 1;
    let Some(len) = tag[body_start..].find(quote) else {
        return tag.to_string();
    };

    format!(
        "{}{}{}",
        &tag[..body_start],
        reveal_style(&tag[body_start..body_start + len]),
        &tag[body_start + len..]
    )
}

/// Splits an inline style into `(property, value)` pairs; properties are
/// lowercased, both sides trimmed, empty declarations dropped.
pub(crate) fn style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            (!prop.is_empty()).then(|| (prop, value.trim().to_string()))
        })
        .collect()
}

fn hides(prop: &str, value: &str) -> bool {
    match prop {
        "opacity" => value
            .trim_end_matches('%')
            .trim()
            .parse::<f32>()
            .is_ok_and(|v| v <= 0.0),
        "visibility" => value.eq_ignore_ascii_case("hidden"),
        _ => false,
    }
}

/// True when an inline style keeps the element from painting.
pub(crate) fn style_hides(style: &str) -> bool {
    style_declarations(style)
        .iter()
        .any(|(prop, value)| hides(prop, value))
}

fn reveal_style(style: &str) -> String {
    style_declarations(style)
        .into_iter()
        .map(|(prop, value)| match prop.as_str() {
            "opacity" if hides(&prop, &value) => "opacity:1".to_string(),
            "visibility" if hides(&prop, &value) => "visibility:visible".to_string(),
            _ => format!("{prop}:{value}"),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Adjusts the capture target right before it is painted.
pub trait PreCaptureHook: Send + Sync {
    fn prepare(&self, target: &mut CaptureTarget);
}

/// Forces lazily revealed canvases and vector graphics to paint; without it
/// the skills chart captures blank.
pub struct ForceVisibility;

impl PreCaptureHook for ForceVisibility {
    fn prepare(&self, target: &mut CaptureTarget) {
        target.force_visible(&["canvas", "svg"]);
    }
}

/// Leaves the target exactly as rendered.
#[cfg(test)]
pub struct NoopHook;

#[cfg(test)]
impl PreCaptureHook for NoopHook {
    fn prepare(&self, _target: &mut CaptureTarget) {}
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Clones `region` into a capture target, runs `hook` on it, and paints it.
    async fn rasterize(
        &self,
        region: &ContentRegion,
        options: &CaptureOptions,
        hook: &dyn PreCaptureHook,
    ) -> Result<RasterImage, RasterError>;
}
