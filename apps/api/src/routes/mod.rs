pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::alignment::handlers as alignment;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/match/score", post(matching::handle_score))
        .route(
            "/api/v1/match/rank-candidates",
            post(matching::handle_rank_candidates),
        )
        .route("/api/v1/match/rank-jobs", post(matching::handle_rank_jobs))
        // Skill alignment API
        .route("/api/v1/skills/align", post(alignment::handle_align))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::embeddings::InMemorySkillStore;

    fn app() -> Router {
        let store = InMemorySkillStore::new()
            .with_vector("react", &[1.0, 0.0])
            .with_vector("reactjs", &[0.96, 0.28])
            .with_vector("postgres", &[0.0, 1.0]);
        build_router(AppState::in_memory(Config::default(), store))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "skillmatch-api");
    }

    #[tokio::test]
    async fn test_score_semantic_and_exact() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({
                "job_skills": ["React", "Postgres"],
                "candidate_skills": [
                    {"skill": "reactjs", "credential_count": 1, "experience_count": 1},
                    {"skill": "postgres", "credential_count": 0, "experience_count": 2}
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let result = &body["result"];
        assert_eq!(result["rejected"], false);
        assert_eq!(result["score"], 100.0);
        assert_eq!(result["coverage"], 1.0);
        assert_eq!(result["matched_pairs"]["react"]["candidate_skill"], "reactjs");
        assert_eq!(result["matched_pairs"]["postgres"]["similarity"], 1.0);
    }

    #[tokio::test]
    async fn test_score_validation_errors() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({"job_skills": [], "candidate_skills": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({"job_skills": ["react"], "similarity_threshold": 1.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({
                "job_skills": ["react"],
                "candidate_skills": [{"skill": "react", "credential_count": -1}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_accepts_null_counts_as_zero() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({
                "job_skills": ["php"],
                "candidate_skills": [
                    {"skill": "php", "credential_count": 1, "experience_count": null}
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["score"], 100.0);
        assert_eq!(body["result"]["matched_pairs"]["php"]["evidence"], 1);
    }

    #[tokio::test]
    async fn test_score_blank_job_skills_is_unprocessable() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/score",
            Some(json!({"job_skills": ["  ", ""], "candidate_skills": []})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EMPTY_JOB_SKILL_SET");
    }

    #[tokio::test]
    async fn test_rank_candidates_drops_malformed_entries() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/rank-candidates",
            Some(json!({
                "job_skills": ["react", "postgres"],
                "candidates": [
                    {"id": "weak", "candidate_skills": [{"skill": "postgres", "credential_count": 1}]},
                    {"id": {"nested": true}, "candidate_skills": []},
                    "not an object",
                    {"id": "strong", "candidate_skills": [
                        {"skill": "react", "credential_count": 1, "experience_count": 1},
                        {"skill": "postgres", "credential_count": 1, "experience_count": 1}
                    ]}
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ranked = body["ranked"].as_array().unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0]["id"], "strong");
        assert_eq!(ranked[1]["id"], "weak");
        assert_eq!(ranked[1]["result"]["score"], 50.0);
    }

    #[tokio::test]
    async fn test_rank_jobs_sinks_jobs_without_skills() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/match/rank-jobs",
            Some(json!({
                "candidate_skills": [{"skill": "react", "experience_count": 3}],
                "jobs": [
                    {"id": 1, "title": "No skills listed"},
                    {"id": 2, "requiredSkills": {"React": 90, "Postgres": 60}},
                    {"id": 3, "job_skills": ["react"]}
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ranked = body["ranked"].as_array().unwrap();
        let ids: Vec<&Value> = ranked.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&json!(3), &json!(2), &json!(1)]);
        assert_eq!(ranked[2]["result"]["rejection_reason"], "invalid_job_skills");
        assert_eq!(ranked[2]["job"]["title"], "No skills listed");
    }

    #[tokio::test]
    async fn test_align_identity_mode_without_text_embedder() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/v1/skills/align",
            Some(json!({"skills": ["React", "Basket  Weaving"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let aligned = body["aligned"].as_array().unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0]["name"], "react");
        assert_eq!(aligned[1]["name"], "basket weaving");
        assert_eq!(body["required_skills"]["basket weaving"], 100);
    }
}
