// Skill matching between the user's declared skills and a career's requirements.
// Drives the "Skills Analysis" card of the on-screen report.

pub mod skill_matcher;

pub use skill_matcher::{skills_chart, ContainmentMatcher, SkillMatcher, SkillsChart};
