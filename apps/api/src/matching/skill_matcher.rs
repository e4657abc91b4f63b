//! Skill Matching: pluggable, trait-based matcher that measures declared skills vs a career.
//!
//! Default: `ContainmentMatcher` (case-insensitive, required-contains-owned substring test).
//!
//! The renderer holds an `Arc<dyn SkillMatcher>` so a stricter or symmetric matcher
//! can be swapped in without touching the view code.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Overlap between owned and required skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMatch {
    /// Owned skills that at least one required skill contains. Duplicates count independently.
    pub matched_count: usize,
    /// `max(0, required.len() - matched_count)`.
    pub remaining_count: usize,
}

/// View model for the skills-analysis card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SkillsChart {
    /// The career lists no required skills; the matcher was not consulted.
    NoData,
    Breakdown { matched: usize, to_learn: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to change how owned skills are credited against a career.
pub trait SkillMatcher: Send + Sync {
    fn match_skills(&self, required: &[String], owned: &[String]) -> SkillMatch;
}

// ────────────────────────────────────────────────────────────────────────────
// ContainmentMatcher (default implementation)
// ────────────────────────────────────────────────────────────────────────────

/// Credits an owned skill when some required skill, lowercased, contains it.
///
/// The test is one-directional: owned "python" matches required "Python 3 / scripting",
/// but owned "python scripting" does not match required "Python".
pub struct ContainmentMatcher;

impl SkillMatcher for ContainmentMatcher {
    fn match_skills(&self, required: &[String], owned: &[String]) -> SkillMatch {
        let required_lower: Vec<String> = required.iter().map(|r| r.to_lowercase()).collect();

        let matched_count = owned
            .iter()
            .map(|skill| skill.to_lowercase())
            .filter(|skill| required_lower.iter().any(|req| req.contains(skill.as_str())))
            .count();

        SkillMatch {
            matched_count,
            remaining_count: required.len().saturating_sub(matched_count),
        }
    }
}

/// Builds the skills card view. An empty requirement list short-circuits to `NoData`.
pub fn skills_chart(matcher: &dyn SkillMatcher, required: &[String], owned: &[String]) -> SkillsChart {
    if required.is_empty() {
        return SkillsChart::NoData;
    }
    let result = matcher.match_skills(required, owned);
    SkillsChart::Breakdown {
        matched: result.matched_count,
        to_learn: result.remaining_count,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
