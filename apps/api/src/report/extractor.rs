//! Structured content extraction from a rendered report.
//!
//! Queries the report markup with CSS selectors and flattens it into an ordered
//! list of typed text blocks. Missing sections are not errors: they simply
//! contribute no blocks, so a report holding only a title still exports.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::region::ContentRegion;

/// Title used when the report has no leading card with a heading.
pub const FALLBACK_TITLE: &str = "Career Path";

pub const SKILLS_HEADING: &str = "Skills Needed";
pub const COURSES_HEADING: &str = "Recommended Courses";
pub const ROADMAP_HEADING: &str = "Learning Roadmap";

const BULLET_GLYPHS: &[char] = &['•', '→', '➤'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Title,
    Description,
    SkillTag,
    CourseItem,
    RoadmapItem,
}

impl BlockKind {
    /// List kinds are drawn as prefixed rows under a synthesized section header.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            BlockKind::SkillTag | BlockKind::CourseItem | BlockKind::RoadmapItem
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl ContentBlock {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Selectors used against the report markup, parsed once per extraction.
struct ReportSelectors {
    first_group: Selector,
    heading: Selector,
    paragraph: Selector,
    section_heading: Selector,
    pill: Selector,
    list_item: Selector,
    roadmap_row: Selector,
}

impl ReportSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            first_group: Selector::parse(".space-y-8 > div:first-child").ok()?,
            heading: Selector::parse("h1, h2, h3").ok()?,
            paragraph: Selector::parse("p").ok()?,
            section_heading: Selector::parse("h2").ok()?,
            pill: Selector::parse("span.rounded-full").ok()?,
            list_item: Selector::parse("li").ok()?,
            roadmap_row: Selector::parse(".flex.gap-6 p, .flex.gap-6 li").ok()?,
        })
    }
}

/// Extracts title, description, skills, courses, and roadmap rows, in that order.
pub fn extract_blocks(region: &ContentRegion) -> Vec<ContentBlock> {
    let Some(selectors) = ReportSelectors::new() else {
        // Selector literals are static; this only guards against a parser regression.
        return vec![ContentBlock::new(BlockKind::Title, FALLBACK_TITLE)];
    };
    let document = Html::parse_fragment(region.html());

    let mut blocks = Vec::new();
    extract_header(&document, &selectors, &mut blocks);

    if let Some(group) = find_section(&document, &selectors, SKILLS_HEADING) {
        blocks.extend(
            group
                .select(&selectors.pill)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .map(|t| ContentBlock::new(BlockKind::SkillTag, t)),
        );
    }

    if let Some(group) = find_section(&document, &selectors, COURSES_HEADING) {
        blocks.extend(
            group
                .select(&selectors.list_item)
                .map(|li| strip_bullet(&element_text(li)))
                .filter(|t| !t.is_empty())
                .map(|t| ContentBlock::new(BlockKind::CourseItem, t)),
        );
    }

    if let Some(group) = find_section(&document, &selectors, ROADMAP_HEADING) {
        blocks.extend(
            group
                .select(&selectors.roadmap_row)
                .map(|row| strip_bullet(&element_text(row)))
                .filter(|t| !t.is_empty() && t != ROADMAP_HEADING)
                .map(|t| ContentBlock::new(BlockKind::RoadmapItem, t)),
        );
    }

    debug!(blocks = blocks.len(), "Extracted report content blocks");
    blocks
}

/// Title and description from the first card of the report.
fn extract_header(document: &Html, selectors: &ReportSelectors, blocks: &mut Vec<ContentBlock>) {
    let first_group = document.select(&selectors.first_group).next();

    let title = first_group
        .and_then(|g| g.select(&selectors.heading).next())
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    blocks.push(ContentBlock::new(BlockKind::Title, title));

    let description = first_group
        .and_then(|g| g.select(&selectors.paragraph).next())
        .map(element_text)
        .unwrap_or_default();
    if !description.is_empty() {
        blocks.push(ContentBlock::new(BlockKind::Description, description));
    }
}

/// The card whose `h2` contains `phrase`, i.e. the heading's parent element.
fn find_section<'a>(
    document: &'a Html,
    selectors: &ReportSelectors,
    phrase: &str,
) -> Option<ElementRef<'a>> {
    document
        .select(&selectors.section_heading)
        .find(|h| element_text(*h).contains(phrase))
        .and_then(|h| h.parent())
        .and_then(ElementRef::wrap)
}

/// Visible text of an element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes one leading bullet glyph and the whitespace around it.
pub fn strip_bullet(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix(BULLET_GLYPHS)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
