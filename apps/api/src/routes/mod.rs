pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::report::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/recommendations", post(handlers::handle_recommend))
        .route("/api/v1/reports/render", post(handlers::handle_render))
        .route("/api/v1/reports/export", post(handlers::handle_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Json,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::export::{ReportExporter, TextFlowStrategy};
    use crate::layout::default_page_config;
    use crate::matching::ContainmentMatcher;
    use crate::recommender::RecommenderClient;
    use crate::report::ReportRenderer;

    fn state(recommender_url: &str, export_dir: &Path) -> AppState {
        AppState {
            recommender: RecommenderClient::new(recommender_url)
                .unwrap()
                .with_backoff(std::time::Duration::from_millis(1)),
            renderer: Arc::new(ReportRenderer::new(Arc::new(ContainmentMatcher))),
            exporter: Arc::new(ReportExporter::new(
                Arc::new(TextFlowStrategy),
                default_page_config(),
                export_dir,
            )),
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn recommendation(career: &str) -> Value {
        json!({
            "career_name": career,
            "required_skills": ["Python", "SQL"],
            "recommended_courses": ["Intro to ML"],
            "roadmap": ["Learn Python", {"phase": "Foundations", "items": ["Statistics"]}],
            "user_skills": ["python"],
            "similar_careers": ["Data Analyst"]
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "pathway-api");
    }

    #[tokio::test]
    async fn test_export_returns_pdf_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(post_json("/api/v1/reports/export", recommendation("Data  Scientist")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Data_Scientist-roadmap.pdf\""
        );
        assert_eq!(headers["x-page-count"], "1");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(dir.path().join("Data_Scientist-roadmap.pdf").exists());
    }

    #[tokio::test]
    async fn test_export_without_career_name_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(post_json("/api/v1/reports/export", recommendation("  ")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_with_missing_career_name_key_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(post_json(
                "/api/v1/reports/export",
                json!({"required_skills": ["Python"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "career_name is required");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_render_returns_html_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(post_json("/api/v1/reports/render", recommendation("Data Scientist")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("id=\"report-content\""));
        assert!(html.contains("Similar Career Paths"));
    }

    #[tokio::test]
    async fn test_recommend_maps_prediction() {
        let upstream = Router::new().route(
            "/predict",
            post(|| async {
                Json(json!({
                    "career": "Data Scientist",
                    "skills": ["Python", "SQL", "Statistics"],
                    "courses": ["Intro to ML"],
                    "roadmap": ["Learn Python"],
                    "similar_careers": ["Data Analyst"]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&format!("http://{addr}"), dir.path()));
        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                json!({"academic": "B.Tech", "skills": "python, sql", "interests": "data", "cgpa": 8.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["recommendation"]["career_name"], "Data Scientist");
        assert_eq!(body["recommendation"]["user_skills"], json!(["python", "sql"]));
        assert_eq!(
            body["skills_chart"],
            json!({"state": "breakdown", "matched": 2, "to_learn": 1})
        );
        assert_eq!(body["similar_careers"], json!(["Data Analyst"]));
    }

    #[tokio::test]
    async fn test_recommender_rejection_surfaces_detail() {
        let upstream = Router::new().route(
            "/predict",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": "Unknown academic background"})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(&format!("http://{addr}"), dir.path()));
        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                json!({"academic": "Astrology", "skills": "python", "interests": "data", "cgpa": 8.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RECOMMENDER_REJECTED");
        assert_eq!(body["error"]["message"], "Unknown academic background");
    }

    #[tokio::test]
    async fn test_unreachable_recommender_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state("http://127.0.0.1:9", dir.path()));

        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                json!({"academic": "B.Tech", "skills": "python", "interests": "data", "cgpa": 8.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "RECOMMENDER_ERROR");
    }
}
