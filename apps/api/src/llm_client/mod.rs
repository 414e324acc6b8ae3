/// Generator client: the single point of entry for local language-model calls.
///
/// Handlers depend on the `Generator` trait, carried in `AppState` as
/// `Arc<dyn Generator>`. `LocalModelClient` is the production backend: it talks
/// to a locally running model server through its completions endpoint.
///
/// Calls are never retried. A failed generation is reported to the caller and
/// the layout engine is not invoked.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::generation::sampling::{ModelChoice, SamplingParams};

pub const DEFAULT_GENERATOR_URL: &str = "http://localhost:4891/v1/completions";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model unavailable (status {status}): {message}")]
    ModelUnavailable { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Prompt in, generated text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        model: ModelChoice,
        prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<String, GeneratorError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// First non-blank choice, trimmed.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .iter()
            .map(|c| c.text.trim())
            .find(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ServerError {
    error: ServerErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    message: String,
}

/// HTTP backend for a local model server.
#[derive(Clone)]
pub struct LocalModelClient {
    client: Client,
    endpoint: String,
    max_tokens: u32,
}

impl LocalModelClient {
    pub fn new(endpoint: String, max_tokens: u32, timeout: Duration) -> Result<Self, GeneratorError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for LocalModelClient {
    async fn generate(
        &self,
        model: ModelChoice,
        prompt: &str,
        sampling: &SamplingParams,
    ) -> Result<String, GeneratorError> {
        let request_body = CompletionRequest {
            model: model.model_name(),
            prompt,
            max_tokens: self.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            top_k: sampling.top_k,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), model = model.model_name(), "Generator call failed");
            let message = serde_json::from_str::<ServerError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GeneratorError::ModelUnavailable {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Generator call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion
            .text()
            .map(str::to_string)
            .ok_or(GeneratorError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral port and returns the completions URL.
    async fn spawn_model_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/completions")
    }

    fn client(url: String) -> LocalModelClient {
        LocalModelClient::new(url, 64, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_completion_text_skips_blank_choices() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"text": "  \n"}, {"text": "  Hola mundo. "}]
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Hola mundo."));
    }

    #[test]
    fn test_completion_text_empty_choices() {
        let response: CompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(response.text().is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_sampling_params_and_returns_text() {
        let router = Router::new().route(
            "/v1/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "Meta-Llama-3-8B-Instruct.Q4_0");
                assert_eq!(body["prompt"], "Escribe algo");
                assert_eq!(body["top_k"], 12);
                assert_eq!(body["max_tokens"], 64);
                Json(json!({
                    "choices": [{"text": " Texto generado. "}],
                    "usage": {"prompt_tokens": 3, "completion_tokens": 4}
                }))
            }),
        );
        let url = spawn_model_server(router).await;

        let sampling = SamplingParams {
            top_k: 12,
            ..SamplingParams::default()
        };
        let text = client(url)
            .generate(ModelChoice::Llama3Instruct, "Escribe algo", &sampling)
            .await
            .unwrap();
        assert_eq!(text, "Texto generado.");
    }

    #[tokio::test]
    async fn test_generate_maps_server_error_to_model_unavailable() {
        let router = Router::new().route(
            "/v1/completions",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": {"message": "model not loaded"}})),
                )
            }),
        );
        let url = spawn_model_server(router).await;

        let err = client(url)
            .generate(ModelChoice::default(), "hola", &SamplingParams::default())
            .await
            .unwrap_err();
        match err {
            GeneratorError::ModelUnavailable { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model not loaded");
            }
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_choices_is_empty_content() {
        let router = Router::new().route(
            "/v1/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let url = spawn_model_server(router).await;

        let err = client(url)
            .generate(ModelChoice::default(), "hola", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyContent));
    }

    #[tokio::test]
    async fn test_generate_unreachable_server_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/v1/completions"))
            .generate(ModelChoice::default(), "hola", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Http(_)));
    }
}
