use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::matching::SkillsChart;
use crate::models::{ProfileInput, Recommendation};
use crate::state::AppState;

const PAGE_COUNT_HEADER: HeaderName = HeaderName::from_static("x-page-count");
const MAX_CGPA: f32 = 10.0;

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub recommendation: Recommendation,
    pub skills_chart: SkillsChart,
    pub similar_careers: Vec<String>,
}

/// POST /api/v1/recommendations
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(profile): Json<ProfileInput>,
) -> Result<Json<RecommendationResponse>, AppError> {
    validate_profile(&profile)?;

    let prediction = state.recommender.predict(&profile).await?;
    let recommendation = Recommendation::from_prediction(prediction, &profile);
    let skills_chart = state.renderer.skills_chart(&recommendation);
    info!(
        "Recommended '{}' ({} skills, {} roadmap phases)",
        recommendation.career_name,
        recommendation.required_skills.len(),
        recommendation.roadmap.len()
    );

    Ok(Json(RecommendationResponse {
        similar_careers: recommendation.similar_careers.clone(),
        recommendation,
        skills_chart,
    }))
}

/// POST /api/v1/reports/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(rec): Json<Recommendation>,
) -> Html<String> {
    Html(state.renderer.render_page(&rec))
}

/// POST /api/v1/reports/export
/// Renders the report, saves it under the export directory, and streams the PDF back.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(rec): Json<Recommendation>,
) -> Result<Response, AppError> {
    if rec.career_name.trim().is_empty() {
        return Err(AppError::Validation("career_name is required".to_string()));
    }

    let region = state.renderer.render(&rec);
    let filename = rec.export_filename();
    let report = state.exporter.export(Some(&region), &filename, None).await?;

    let bytes = tokio::fs::read(&report.path).await.map_err(|e| {
        AppError::Internal(anyhow::Error::new(e).context("reading exported PDF back"))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&filename)),
            (PAGE_COUNT_HEADER, report.page_count.to_string()),
        ],
        bytes,
    )
        .into_response())
}

fn validate_profile(profile: &ProfileInput) -> Result<(), AppError> {
    for (field, value) in [
        ("academic", &profile.academic),
        ("skills", &profile.skills),
        ("interests", &profile.interests),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    if !(0.0..=MAX_CGPA).contains(&profile.cgpa) {
        return Err(AppError::Validation(format!(
            "cgpa must be between 0 and {MAX_CGPA}"
        )));
    }
    Ok(())
}

/// `Content-Disposition` value; characters a quoted header value cannot carry become `_`.
fn attachment(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
