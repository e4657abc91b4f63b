//! Recommender Client: the single point of entry for calls to the career
//! prediction service.
//!
//! Posts the profile form to `{base_url}/predict` and returns the raw
//! prediction; mapping onto a `Recommendation` happens in the models layer.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{PredictResponse, ProfileInput};

const PREDICT_PATH: &str = "/predict";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recommender error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Recommender returned no career")]
    EmptyPrediction,

    #[error("Recommender unavailable after {retries} attempts")]
    Unavailable { retries: u32 },
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct RecommenderClient {
    client: Client,
    base_url: String,
    backoff: Duration,
}

impl RecommenderClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RecommenderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the first retry delay; later retries double it.
    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Requests a prediction for `profile`.
    /// Retries on connection failures, 429, and 5xx with exponential backoff.
    pub async fn predict(&self, profile: &ProfileInput) -> Result<PredictResponse, RecommenderError> {
        let url = format!("{}{}", self.base_url, PREDICT_PATH);
        let mut last_error: Option<RecommenderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "Recommender call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(profile).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RecommenderError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Recommender returned {}: {}", status, body);
                last_error = Some(RecommenderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|e| match e.detail {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or(body);
                return Err(RecommenderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let prediction: PredictResponse = response.json().await?;
            if prediction.career.trim().is_empty() {
                return Err(RecommenderError::EmptyPrediction);
            }

            debug!(
                "Recommender call succeeded: career={}, skills={}, courses={}",
                prediction.career,
                prediction.skills.len(),
                prediction.courses.len()
            );
            return Ok(prediction);
        }

        Err(last_error.unwrap_or(RecommenderError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    fn profile() -> ProfileInput {
        ProfileInput {
            academic: "B.Tech Computer Science".to_string(),
            skills: "python, sql".to_string(),
            interests: "data".to_string(),
            cgpa: 8.2,
        }
    }

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_predict_posts_profile_and_parses_prediction() {
        let router = Router::new().route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["skills"], "python, sql");
                Json(json!({
                    "career": "Data Scientist",
                    "skills": ["Python", "SQL"],
                    "courses": ["Intro to ML"],
                    "roadmap": ["Learn Python", {"phase": "Foundations", "items": ["Stats"]}]
                }))
            }),
        );
        let client = RecommenderClient::new(serve(router).await).unwrap();

        let prediction = client.predict(&profile()).await.unwrap();
        assert_eq!(prediction.career, "Data Scientist");
        assert_eq!(prediction.roadmap.len(), 2);
        assert!(prediction.similar_careers.is_empty());
    }

    #[tokio::test]
    async fn test_predict_retries_server_errors() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/predict",
                post(|State(hits): State<Arc<AtomicU32>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        return Err(StatusCode::SERVICE_UNAVAILABLE);
                    }
                    Ok(Json(json!({"career": "Data Analyst"})))
                }),
            )
            .with_state(hits.clone());
        let client = RecommenderClient::new(serve(router).await)
            .unwrap()
            .with_backoff(Duration::from_millis(10));

        let prediction = client.predict(&profile()).await.unwrap();
        assert_eq!(prediction.career, "Data Analyst");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_predict_does_not_retry_client_errors() {
        let hits = Arc::new(AtomicU32::new(0));
        let router = Router::new()
            .route(
                "/predict",
                post(|State(hits): State<Arc<AtomicU32>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"detail": "cgpa must be a number"})),
                    )
                }),
            )
            .with_state(hits.clone());
        let client = RecommenderClient::new(serve(router).await)
            .unwrap()
            .with_backoff(Duration::from_millis(10));

        let err = client.predict(&profile()).await.unwrap_err();
        match err {
            RecommenderError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "cgpa must be a number");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_career_is_an_error() {
        let router = Router::new().route("/predict", post(|| async { Json(json!({"career": " "})) }));
        let client = RecommenderClient::new(serve(router).await).unwrap();

        let err = client.predict(&profile()).await.unwrap_err();
        assert!(matches!(err, RecommenderError::EmptyPrediction));
    }
}
