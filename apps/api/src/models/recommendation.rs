use serde::{Deserialize, Serialize};

/// Description shown under the career name. The recommendation service does not
/// return one, so every recommendation carries the same sentence.
pub const DEFAULT_CAREER_DESCRIPTION: &str =
    "Your recommended career path based on your skills, interests, and academic background.";

/// A single career recommendation as consumed by the report renderer.
///
/// Built once per successful call to the recommendation service and never
/// mutated afterwards; the next submission replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Blank when the caller omitted it; handlers reject that with a validation error.
    #[serde(default)]
    pub career_name: String,
    #[serde(default)]
    pub career_description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub recommended_courses: Vec<String>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapPhase>,
    /// Skills the user typed into the profile form, in input order. Duplicates are kept.
    #[serde(default)]
    pub user_skills: Vec<String>,
    #[serde(default)]
    pub similar_careers: Vec<String>,
}

/// One step of the learning roadmap.
///
/// The recommendation service returns either bare strings or structured
/// objects, sometimes mixed within the same roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoadmapPhase {
    Label(String),
    Phase {
        #[serde(default)]
        phase: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<String>,
        #[serde(default)]
        items: Vec<String>,
    },
}

impl RoadmapPhase {
    /// Heading shown above a structured phase. Unnamed phases fall back to `Phase {n}`.
    pub fn heading(&self, position: usize) -> Option<String> {
        match self {
            RoadmapPhase::Label(_) => None,
            RoadmapPhase::Phase { phase, .. } if phase.trim().is_empty() => {
                Some(format!("Phase {}", position + 1))
            }
            RoadmapPhase::Phase { phase, .. } => Some(phase.clone()),
        }
    }

    /// The rows displayed for this phase. A structured phase without items
    /// displays its own label as the only row.
    pub fn rows(&self) -> Vec<&str> {
        match self {
            RoadmapPhase::Label(text) => vec![text.as_str()],
            RoadmapPhase::Phase { phase, items, .. } if items.is_empty() => vec![phase.as_str()],
            RoadmapPhase::Phase { items, .. } => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn duration(&self) -> Option<&str> {
        match self {
            RoadmapPhase::Phase {
                duration: Some(d), ..
            } if !d.trim().is_empty() => Some(d.as_str()),
            _ => None,
        }
    }

    pub fn has_items(&self) -> bool {
        matches!(self, RoadmapPhase::Phase { items, .. } if !items.is_empty())
    }
}

/// Profile attributes collected by the input form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInput {
    pub academic: String,
    /// Comma-separated list, e.g. "Python, SQL, Machine Learning".
    pub skills: String,
    pub interests: String,
    pub cgpa: f32,
}

impl ProfileInput {
    /// Splits the comma-separated skills field, trimming entries and dropping empties.
    pub fn user_skills(&self) -> Vec<String> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Response body of the recommendation service's `/predict` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub career: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapPhase>,
    #[serde(default)]
    pub similar_careers: Vec<String>,
}

impl Recommendation {
    /// Combines a prediction with the profile that produced it.
    pub fn from_prediction(prediction: PredictResponse, profile: &ProfileInput) -> Self {
        Recommendation {
            career_name: prediction.career,
            career_description: DEFAULT_CAREER_DESCRIPTION.to_string(),
            required_skills: prediction.skills,
            recommended_courses: prediction.courses,
            roadmap: prediction.roadmap,
            user_skills: profile.user_skills(),
            similar_careers: prediction.similar_careers,
        }
    }

    /// Export filename: whitespace runs in the career name collapse to `_`.
    pub fn export_filename(&self) -> String {
        let stem = self
            .career_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("{stem}-roadmap.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(skills: &str) -> ProfileInput {
        ProfileInput {
            academic: "BSc Computer Science".to_string(),
            skills: skills.to_string(),
            interests: "data".to_string(),
            cgpa: 8.1,
        }
    }

    #[test]
    fn test_roadmap_accepts_mixed_shapes() {
        let roadmap: Vec<RoadmapPhase> = serde_json::from_value(json!([
            "Learn Python basics",
            {"phase": "Foundations", "duration": "3 months", "items": ["Statistics", "SQL"]},
            {"phase": "Capstone"}
        ]))
        .unwrap();

        assert_eq!(roadmap[0], RoadmapPhase::Label("Learn Python basics".to_string()));
        assert!(roadmap[1].has_items());
        assert_eq!(roadmap[1].duration(), Some("3 months"));
        assert_eq!(roadmap[2].rows(), vec!["Capstone"]);
    }

    #[test]
    fn test_phase_without_items_displays_its_label() {
        let phase = RoadmapPhase::Phase {
            phase: "Build a portfolio".to_string(),
            duration: None,
            items: vec![],
        };
        assert_eq!(phase.rows(), vec!["Build a portfolio"]);
        assert!(!phase.has_items());
    }

    #[test]
    fn test_unnamed_phase_heading_uses_position() {
        let phase = RoadmapPhase::Phase {
            phase: String::new(),
            duration: None,
            items: vec!["Docker".to_string()],
        };
        assert_eq!(phase.heading(2).as_deref(), Some("Phase 3"));
        assert_eq!(RoadmapPhase::Label("x".to_string()).heading(0), None);
    }

    #[test]
    fn test_user_skills_split_and_trimmed() {
        let p = profile(" Python, SQL ,, Machine Learning ,");
        assert_eq!(p.user_skills(), vec!["Python", "SQL", "Machine Learning"]);
        assert!(profile("").user_skills().is_empty());
    }

    #[test]
    fn test_from_prediction_defaults_missing_arrays() {
        let prediction: PredictResponse =
            serde_json::from_value(json!({"career": "Data Scientist"})).unwrap();
        let rec = Recommendation::from_prediction(prediction, &profile("python"));
        assert_eq!(rec.career_name, "Data Scientist");
        assert_eq!(rec.career_description, DEFAULT_CAREER_DESCRIPTION);
        assert!(rec.required_skills.is_empty());
        assert!(rec.roadmap.is_empty());
        assert_eq!(rec.user_skills, vec!["python"]);
    }

    #[test]
    fn test_export_filename_collapses_whitespace() {
        let rec = Recommendation {
            career_name: "Machine  Learning\tEngineer".to_string(),
            career_description: String::new(),
            required_skills: vec![],
            recommended_courses: vec![],
            roadmap: vec![],
            user_skills: vec![],
            similar_careers: vec![],
        };
        assert_eq!(rec.export_filename(), "Machine_Learning_Engineer-roadmap.pdf");
    }
}
