//! Text-embedding client for the canonical skill aligner.
//!
//! Posts `{"texts": [...]}` and accepts either a bare array of vectors or
//! `{"embeddings": [...]}`. An object carrying an `error` key is a failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embeddings::{EmbeddingError, TextEmbedder};
use crate::skills::SkillVector;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbedResponse {
    Bare(Vec<Vec<f32>>),
    Wrapped { embeddings: Vec<Vec<f32>> },
    Failed { error: String },
}

#[derive(Clone)]
pub struct HttpTextEmbedder {
    client: Client,
    endpoint: String,
}

impl HttpTextEmbedder {
    pub fn new(endpoint: String, request_timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TextEmbedder for HttpTextEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<SkillVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { texts })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Text embedding service returned {status}: {body}");
            return Err(EmbeddingError::Service {
                status: status.as_u16(),
                message: body,
            });
        }

        let vectors = match response.json::<EmbedResponse>().await? {
            EmbedResponse::Bare(v) | EmbedResponse::Wrapped { embeddings: v } => v,
            EmbedResponse::Failed { error } => return Err(EmbeddingError::Malformed(error)),
        };

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Malformed(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        debug!("Embedded {} texts", vectors.len());
        Ok(vectors.into_iter().map(SkillVector::new).collect())
    }
}

/// Stand-in when no embedding service is configured. The aligner treats
/// the failure as "identity mode".
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTextEmbedder;

#[async_trait]
impl TextEmbedder for DisabledTextEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<SkillVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        Err(EmbeddingError::Disabled)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::http::StatusCode;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves `app` on an ephemeral local port and returns its `/embed` URL.
    pub(crate) async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/embed")
    }

    /// Embedding endpoint that always answers with `status` and `body`.
    pub(crate) async fn fixed_response(status: StatusCode, body: Value) -> String {
        serve(Router::new().route(
            "/embed",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        ))
        .await
    }

    /// Embedding endpoint returning `[i + 1, 0]` for the i-th posted text.
    async fn counting_service() -> String {
        serve(Router::new().route(
            "/embed",
            post(|Json(req): Json<Value>| async move {
                let n = req["texts"].as_array().map_or(0, Vec::len);
                let vectors: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32 + 1.0, 0.0]).collect();
                Json(json!({ "embeddings": vectors }))
            }),
        ))
        .await
    }

    fn embedder(url: String) -> HttpTextEmbedder {
        HttpTextEmbedder::new(url, Duration::from_secs(5)).unwrap()
    }

    fn texts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_posts_texts_and_keeps_input_order() {
        let client = embedder(counting_service().await);
        let vectors = client.embed_texts(&texts(&["rust", "go", "sql"])).await.unwrap();
        let firsts: Vec<f32> = vectors.iter().map(|v| v.values()[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_service_error() {
        let url = fixed_response(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"})).await;
        let err = embedder(url).embed_texts(&texts(&["rust"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Service { status: 500, ref message } if message.contains("boom")));
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_is_malformed() {
        let url = fixed_response(StatusCode::OK, json!([[1.0, 0.0]])).await;
        let err = embedder(url).embed_texts(&texts(&["rust", "go"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_error_body_is_malformed() {
        let url = fixed_response(StatusCode::OK, json!({"error": "embedding_failed"})).await;
        let err = embedder(url).embed_texts(&texts(&["rust"])).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(ref m) if m == "embedding_failed"));
    }

    #[tokio::test]
    async fn test_empty_batch_never_calls_the_service() {
        let client = embedder("http://127.0.0.1:1/embed".to_string());
        assert!(client.embed_texts(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_response_shapes_decode() {
        let bare: EmbedResponse = serde_json::from_str("[[0.1, 0.2], [0.3, 0.4]]").unwrap();
        assert!(matches!(bare, EmbedResponse::Bare(v) if v.len() == 2));

        let wrapped: EmbedResponse =
            serde_json::from_str(r#"{"embeddings": [[1.0]]}"#).unwrap();
        assert!(matches!(wrapped, EmbedResponse::Wrapped { embeddings } if embeddings.len() == 1));

        let failed: EmbedResponse =
            serde_json::from_str(r#"{"error": "embedding_failed"}"#).unwrap();
        assert!(matches!(failed, EmbedResponse::Failed { error } if error == "embedding_failed"));
    }

    #[tokio::test]
    async fn test_disabled_embedder_fails_non_empty_batches_only() {
        let embedder = DisabledTextEmbedder;
        assert!(embedder.embed_texts(&[]).await.unwrap().is_empty());
        assert!(matches!(
            embedder.embed_texts(&["rust".to_string()]).await,
            Err(EmbeddingError::Disabled)
        ));
    }
}
