//! HTML rendering of the results panel.
//!
//! The markup mirrors the card layout of the web client: a career card, the
//! skills-analysis chart, a "Skills Needed" pill list, a "Recommended Courses"
//! list, and the "Learning Roadmap" timeline. Class names are part of the
//! contract with `extractor` and the wireframe rasterizer.

use std::fmt::Write;
use std::sync::Arc;

use crate::matching::{skills_chart, SkillMatcher, SkillsChart};
use crate::models::{Recommendation, RoadmapPhase};
use crate::report::region::ContentRegion;

/// Id of the report container element inside a full page.
pub const REPORT_CONTAINER_ID: &str = "report-content";

#[derive(Clone)]
pub struct ReportRenderer {
    matcher: Arc<dyn SkillMatcher>,
}

impl ReportRenderer {
    pub fn new(matcher: Arc<dyn SkillMatcher>) -> Self {
        Self { matcher }
    }

    pub fn skills_chart(&self, rec: &Recommendation) -> SkillsChart {
        skills_chart(self.matcher.as_ref(), &rec.required_skills, &rec.user_skills)
    }

    /// Renders the exportable report region.
    pub fn render(&self, rec: &Recommendation) -> ContentRegion {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div id="{REPORT_CONTAINER_ID}" class="space-y-8">"#
        );
        render_career_card(&mut html, rec);
        render_skills_analysis(&mut html, &self.skills_chart(rec));
        if !rec.required_skills.is_empty() {
            render_skills_needed(&mut html, &rec.required_skills);
        }
        if !rec.recommended_courses.is_empty() {
            render_courses(&mut html, &rec.recommended_courses);
        }
        render_roadmap(&mut html, &rec.roadmap);
        html.push_str("</div>");

        ContentRegion::new(html, rec.career_name.clone())
    }

    /// Renders a standalone page: the report region followed by the similar-careers card.
    pub fn render_page(&self, rec: &Recommendation) -> String {
        let region = self.render(rec);
        let mut page = String::new();
        let _ = write!(
            page,
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{} | Career Path Recommender</title></head><body><main>",
            escape_html(&rec.career_name)
        );
        page.push_str(region.html());
        render_similar_careers(&mut page, &rec.similar_careers);
        page.push_str("</main></body></html>");
        page
    }
}

fn render_career_card(out: &mut String, rec: &Recommendation) {
    let _ = write!(
        out,
        r#"<div class="card career-card"><span class="eyebrow">Recommended Path</span><h1>{}</h1><p>{}</p></div>"#,
        escape_html(&rec.career_name),
        escape_html(&rec.career_description)
    );
}

fn render_skills_analysis(out: &mut String, chart: &SkillsChart) {
    match chart {
        SkillsChart::NoData => {
            out.push_str(
                r#"<div class="card no-data"><span>No skill data available for this career yet.</span></div>"#,
            );
        }
        SkillsChart::Breakdown { matched, to_learn } => {
            // The chart canvas fades in client-side; it starts transparent.
            let _ = write!(
                out,
                r#"<div class="card skills-analysis"><h2>Skills Analysis</h2><canvas class="skills-chart" width="320" height="320" data-matched="{matched}" data-to-learn="{to_learn}" style="opacity:0"></canvas><div class="grid grid-cols-2"><div class="stat"><span class="stat-value">{matched}</span><span class="stat-label">Matched Skills</span></div><div class="stat"><span class="stat-value">{to_learn}</span><span class="stat-label">To Learn</span></div></div></div>"#
            );
        }
    }
}

fn render_skills_needed(out: &mut String, skills: &[String]) {
    out.push_str(r#"<div class="card"><h2>Skills Needed</h2><div class="flex flex-wrap gap-2">"#);
    for skill in skills {
        let _ = write!(
            out,
            r#"<span class="px-3 py-1 rounded-full">{}</span>"#,
            escape_html(skill)
        );
    }
    out.push_str("</div></div>");
}

fn render_courses(out: &mut String, courses: &[String]) {
    out.push_str(r#"<div class="card"><h2>Recommended Courses</h2><ul class="space-y-2">"#);
    for course in courses {
        let _ = write!(
            out,
            r#"<li class="flex items-start gap-3"><span class="bullet">•</span><span>{}</span></li>"#,
            escape_html(course)
        );
    }
    out.push_str("</ul></div>");
}

fn render_roadmap(out: &mut String, roadmap: &[RoadmapPhase]) {
    if roadmap.is_empty() {
        out.push_str(
            r#"<div class="card no-data"><span>No roadmap available for this career yet.</span></div>"#,
        );
        return;
    }

    out.push_str(r#"<div class="card"><h2>Learning Roadmap</h2><div class="space-y-8">"#);
    for (index, phase) in roadmap.iter().enumerate() {
        let _ = write!(
            out,
            r#"<div class="flex gap-6"><div class="flex flex-col items-center"><div class="step">{}</div></div><div class="pb-8 flex-1">"#,
            index + 1
        );
        if let Some(heading) = phase.heading(index) {
            let _ = write!(out, "<h3>{}</h3>", escape_html(&heading));
        }
        if let Some(duration) = phase.duration() {
            let _ = write!(
                out,
                r#"<p class="duration">Duration: {}</p>"#,
                escape_html(duration)
            );
        }
        if phase.has_items() {
            out.push_str(r#"<ul class="space-y-2">"#);
            for item in phase.rows() {
                let _ = write!(
                    out,
                    r#"<li class="flex items-start gap-3"><span class="bullet">→</span><span>{}</span></li>"#,
                    escape_html(item)
                );
            }
            out.push_str("</ul>");
        } else {
            for row in phase.rows() {
                let _ = write!(out, "<p>{}</p>", escape_html(row));
            }
        }
        out.push_str("</div></div>");
    }
    out.push_str("</div></div>");
}

fn render_similar_careers(out: &mut String, careers: &[String]) {
    if careers.is_empty() {
        return;
    }
    out.push_str(r#"<div class="card similar-careers"><h2>Similar Career Paths</h2><div class="grid">"#);
    for career in careers {
        let _ = write!(
            out,
            r#"<div class="similar-career"><p>{}</p></div>"#,
            escape_html(career)
        );
    }
    out.push_str("</div></div>");
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
