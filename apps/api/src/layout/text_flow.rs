//! Text Flow Pagination: lays content blocks onto fixed-size pages.
//!
//! # State machine
//! A single cursor `y` (mm from the top edge) starts at the top margin and only
//! moves down. Before each block a fixed lookahead decides whether the block
//! starts on a fresh page; while drawing, a line that would cross the bottom
//! margin moves to the next page, so long blocks spill across the boundary.
//!
//! # Spacing (mm)
//! - Title: 24pt bold, +15 after
//! - Description: 12pt, +15 after
//! - Section header: 18pt bold, +8 after, synthesized once per list kind
//! - List row: 12pt, +4 after; +15 after the last row of a section

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig, PT_TO_MM};
use crate::report::{BlockKind, ContentBlock};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Fill colour as 8-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const PRIMARY: Rgb = Rgb(6, 182, 212);
pub const BLACK: Rgb = Rgb(0, 0, 0);

/// One physical line of text at a fixed position on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    /// Top of the line box.
    pub y_mm: f32,
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
}

impl TextRun {
    /// Builds a run positioned by its baseline instead of its line-box top.
    pub fn at_baseline(
        text: impl Into<String>,
        x_mm: f32,
        baseline_mm: f32,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
    ) -> Self {
        Self {
            text: text.into(),
            x_mm,
            y_mm: baseline_mm - size_pt * PT_TO_MM * BASELINE_RATIO,
            face,
            size_pt,
            color,
        }
    }

    /// Baseline position; the glyph ascent sits above it inside the line box.
    pub fn baseline_mm(&self) -> f32 {
        self.y_mm + self.size_pt * PT_TO_MM * BASELINE_RATIO
    }
}

/// Page bookkeeping: 1-based index and where the cursor ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub cursor_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page: Page,
    pub runs: Vec<TextRun>,
}

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

const TITLE_SIZE_PT: f32 = 24.0;
const HEADER_SIZE_PT: f32 = 18.0;
const BODY_SIZE_PT: f32 = 12.0;

const TITLE_GAP_MM: f32 = 15.0;
const DESCRIPTION_GAP_MM: f32 = 15.0;
const HEADER_GAP_MM: f32 = 8.0;
const ITEM_GAP_MM: f32 = 4.0;
const SECTION_GAP_MM: f32 = 15.0;

/// Space that must remain below the cursor before a section starts.
const SECTION_LOOKAHEAD_MM: f32 = 40.0;
/// Space that must remain below the cursor before a list row starts.
const ITEM_LOOKAHEAD_MM: f32 = 8.0;

const BASELINE_RATIO: f32 = 0.8;

/// Header synthesized before the first block of a list kind.
pub fn section_label(kind: BlockKind) -> Option<&'static str> {
    match kind {
        BlockKind::SkillTag => Some("Required Skills"),
        BlockKind::CourseItem => Some("Recommended Courses"),
        BlockKind::RoadmapItem => Some("Learning Roadmap"),
        BlockKind::Title | BlockKind::Description => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paginator
// ────────────────────────────────────────────────────────────────────────────

struct TextFlowPaginator {
    config: PageConfig,
    pages: Vec<PageLayout>,
    runs: Vec<TextRun>,
    y: f32,
}

impl TextFlowPaginator {
    fn new(config: PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            runs: Vec::new(),
            y: config.margin_mm,
        }
    }

    fn break_page(&mut self) {
        let index = self.pages.len() + 1;
        self.pages.push(PageLayout {
            page: Page {
                index,
                cursor_y: self.y,
            },
            runs: std::mem::take(&mut self.runs),
        });
        self.y = self.config.margin_mm;
    }

    fn ensure_space(&mut self, required_mm: f32) {
        if self.y > self.config.margin_mm && self.y + required_mm > self.config.bottom_mm() {
            self.break_page();
        }
    }

    fn draw(&mut self, text: &str, face: FontFace, size_pt: f32, color: Rgb) {
        let line_height = size_pt * PT_TO_MM;
        let lines = get_metrics(face).wrap_lines(text, size_pt, self.config.text_width_mm());
        for line in lines {
            if self.y > self.config.margin_mm && self.y + line_height > self.config.bottom_mm() {
                self.break_page();
            }
            self.runs.push(TextRun {
                text: line,
                x_mm: self.config.margin_mm,
                y_mm: self.y,
                face,
                size_pt,
                color,
            });
            self.y += line_height;
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.break_page();
        self.pages
    }
}

/// Lays out `blocks` in order and returns every page with its positioned runs.
///
/// Always returns at least one page. Deterministic: the same blocks and page
/// geometry always produce the same pages.
pub fn layout(blocks: &[ContentBlock], config: &PageConfig) -> Vec<PageLayout> {
    let mut flow = TextFlowPaginator::new(*config);
    let mut previous: Option<BlockKind> = None;
    let mut headers_drawn: HashSet<BlockKind> = HashSet::new();
    let mut roadmap_step = 0usize;

    for block in blocks {
        if let Some(prev) = previous {
            if prev.is_list() && prev != block.kind {
                flow.y += SECTION_GAP_MM;
            }
        }

        match block.kind {
            BlockKind::Title => {
                flow.ensure_space(SECTION_LOOKAHEAD_MM);
                flow.draw(&block.text, FontFace::HelveticaBold, TITLE_SIZE_PT, PRIMARY);
                flow.y += TITLE_GAP_MM;
            }
            BlockKind::Description => {
                flow.ensure_space(SECTION_LOOKAHEAD_MM);
                flow.draw(&block.text, FontFace::Helvetica, BODY_SIZE_PT, BLACK);
                flow.y += DESCRIPTION_GAP_MM;
            }
            kind => {
                if previous != Some(kind) && headers_drawn.insert(kind) {
                    if let Some(label) = section_label(kind) {
                        flow.ensure_space(SECTION_LOOKAHEAD_MM);
                        flow.draw(label, FontFace::HelveticaBold, HEADER_SIZE_PT, PRIMARY);
                        flow.y += HEADER_GAP_MM;
                    }
                }

                let row = match kind {
                    BlockKind::RoadmapItem => {
                        roadmap_step += 1;
                        format!("{roadmap_step}. {}", block.text)
                    }
                    _ => format!("• {}", block.text),
                };
                flow.ensure_space(ITEM_LOOKAHEAD_MM);
                flow.draw(&row, FontFace::Helvetica, BODY_SIZE_PT, BLACK);
                flow.y += ITEM_GAP_MM;
            }
        }
        previous = Some(block.kind);
    }

    let pages = flow.finish();
    debug!(blocks = blocks.len(), pages = pages.len(), "Text flow layout complete");
    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
