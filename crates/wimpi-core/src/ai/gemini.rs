//! Google Gemini backend implementation
//!
//! Calls the `generateContent` endpoint with a single user turn. The whole
//! prompt (system instructions, financial context and the user's message) is
//! composed by the caller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::ChatBackend;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Requires `GEMINI_API_KEY`; `GEMINI_MODEL` and `GEMINI_API_URL` are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingApiKey("GEMINI_API_KEY"))?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let base_url =
            std::env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string());
        Ok(Self::new(&base_url, &model, &api_key))
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Map a failed call to the error the user should see
///
/// Quota exhaustion is checked first since Gemini also reports it as 429.
fn classify_error(status: Option<StatusCode>, message: &str) -> Error {
    let lower = message.to_lowercase();
    if lower.contains("quota") {
        Error::QuotaExceeded
    } else if status == Some(StatusCode::TOO_MANY_REQUESTS)
        || lower.contains("rate limit")
        || lower.contains("rate-limit")
    {
        Error::RateLimited
    } else {
        match status {
            Some(status) => Error::Ai(format!("Gemini API error {}: {}", status, message)),
            None => Error::Ai(message.to_string()),
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::new(prompt);
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(%status, "Gemini request failed: {}", message);
            return Err(classify_error(Some(status), &message));
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body
            .into_text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Ai("Invalid response from Gemini: no candidate text".into()))?;

        debug!(reply_len = text.len(), "Gemini reply received");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockGeminiServer, MockReply};

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest::new("Halo");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Halo");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        let settings = json["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(
            classify_error(
                Some(StatusCode::TOO_MANY_REQUESTS),
                "You exceeded your current quota"
            ),
            Error::QuotaExceeded
        ));
        assert!(matches!(
            classify_error(Some(StatusCode::TOO_MANY_REQUESTS), "Slow down"),
            Error::RateLimited
        ));
        assert!(matches!(
            classify_error(None, "Rate limit reached"),
            Error::RateLimited
        ));
        // "generate" must not be mistaken for a rate limit
        assert!(matches!(
            classify_error(Some(StatusCode::BAD_REQUEST), "Failed to generate content"),
            Error::Ai(_)
        ));
    }

    #[test]
    fn test_endpoint_and_with_model() {
        let backend = GeminiBackend::new("http://localhost:1/", "gemini-2.5-flash", "k");
        assert_eq!(
            backend.endpoint(),
            "http://localhost:1/models/gemini-2.5-flash:generateContent"
        );
        let other = backend.with_model("gemini-2.5-pro");
        assert_eq!(other.model(), "gemini-2.5-pro");
        assert_eq!(backend.model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_generate_against_mock_server() {
        let server = MockGeminiServer::start(MockReply::Text("Sisihkan 20%.".into())).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "test-key");

        let reply = backend.generate("Bagaimana cara menabung?").await.unwrap();
        assert_eq!(reply, "Sisihkan 20%.");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model_call, "gemini-2.5-flash:generateContent");
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
        assert_eq!(
            requests[0].body["contents"][0]["parts"][0]["text"],
            "Bagaimana cara menabung?"
        );
    }

    #[tokio::test]
    async fn test_generate_maps_quota_and_rate_errors() {
        let server = MockGeminiServer::start(MockReply::QuotaExceeded).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "k");
        assert!(matches!(
            backend.generate("x").await,
            Err(Error::QuotaExceeded)
        ));

        let server = MockGeminiServer::start(MockReply::RateLimited).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "k");
        assert!(matches!(backend.generate("x").await, Err(Error::RateLimited)));
    }

    #[tokio::test]
    async fn test_generate_without_candidates() {
        let server = MockGeminiServer::start(MockReply::NoCandidates).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "k");
        let err = backend.generate("x").await.unwrap_err();
        assert!(matches!(err, Error::Ai(ref m) if m.contains("no candidate text")));
    }
}
