//! Gemini (Google) Generative Language API client.

use crate::config::Config;
use crate::error::{CuratorError, Result, api_error_message, parse_retry_after};
use crate::session::{ContentGenerator, ContentPart};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Generation method a model must advertise to be usable here.
pub const GENERATE_CONTENT_METHOD: &str = "generateContent";

const MODELS_PAGE_SIZE: &str = "50";

/// Model metadata returned by `models.list`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT_METHOD)
    }
}

/// Client for a single configured model.
pub struct GeminiClient {
    client: reqwest::Client,
    config: Config,
}

impl GeminiClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Issues one `generateContent` call and returns the concatenated text of
    /// the first candidate.
    pub async fn generate_content(&self, parts: &[ContentPart]) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        );
        let body = GenerateContentRequest::from_parts(parts);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let response: GenerateContentResponse = response.json().await?;
        response.into_text()
    }

    /// Lists every model visible to the credential, following pagination.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/v1beta/models", self.config.api_base);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", MODELS_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let headers = response.headers().clone();
                let text = response.text().await.unwrap_or_default();
                return Err(parse_error(status.as_u16(), &text, &headers));
            }

            let page: ListModelsResponse = response.json().await?;
            log::debug!("Fetched {} models", page.models.len());
            models.extend(page.models);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    type Error = CuratorError;

    async fn generate(&self, parts: &[ContentPart]) -> Result<String> {
        self.generate_content(parts).await
    }

    fn model_name(&self) -> &str {
        self.model()
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> CuratorError {
    let message = api_error_message(text);
    match status {
        401 | 403 => CuratorError::Auth(message),
        429 => CuratorError::RateLimited {
            retry_after: parse_retry_after(headers),
        },
        _ => CuratorError::Api { status, message },
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentRequest {
    fn from_parts(parts: &[ContentPart]) -> Self {
        let parts = parts
            .iter()
            .map(|part| match part {
                ContentPart::Image { mime_type, data } => RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(data),
                    },
                },
                ContentPart::Text(text) => RequestPart::Text { text: text.clone() },
            })
            .collect();

        Self {
            contents: vec![RequestContent { role: "user", parts }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
                return Err(CuratorError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            CuratorError::UnexpectedResponse("No candidates in Gemini response".into())
        })?;

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                match reason {
                    "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => {
                        return Err(CuratorError::ContentBlocked(format!(
                            "Response blocked by Gemini safety filter: {reason}"
                        )));
                    }
                    // STOP, MAX_TOKENS: an empty answer, not a failure
                    _ => {}
                }
            }
        }

        Ok(parts.into_iter().filter_map(|p| p.text).collect::<String>())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
        GeminiClient::new(Config::new("test-key").with_api_base(server.url()))
    }

    #[test]
    fn test_request_orders_image_before_text() {
        let parts = vec![
            ContentPart::Image {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            },
            ContentPart::Text("describe".into()),
        ];
        let json = serde_json::to_value(GenerateContentRequest::from_parts(&parts)).unwrap();
        let parts = &json["contents"][0]["parts"];

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AQID");
        assert_eq!(parts[1]["text"], "describe");
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "**Name:** Denarius\n"}, {"text": "**Origin:** Rome"}]},
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_text().unwrap(),
            "**Name:** Denarius\n**Origin:** Rome"
        );
    }

    #[test]
    fn test_response_prompt_blocked() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = resp.into_text().unwrap_err();
        assert!(matches!(err, CuratorError::ContentBlocked(ref m) if m == "Prompt blocked: SAFETY"));
    }

    #[test]
    fn test_response_safety_finish_without_parts() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_text().unwrap_err(),
            CuratorError::ContentBlocked(_)
        ));
    }

    #[test]
    fn test_response_empty_candidate_is_empty_text() {
        let json = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_text().unwrap(), "");
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            resp.into_text().unwrap_err(),
            CuratorError::UnexpectedResponse(_)
        ));
    }

    #[test]
    fn test_model_info_filter() {
        let json = r#"{
            "name": "models/embedding-001",
            "displayName": "Embedding 001",
            "supportedGenerationMethods": ["embedContent"]
        }"#;
        let model: ModelInfo = serde_json::from_str(json).unwrap();
        assert!(!model.supports_generate_content());

        let model = ModelInfo {
            supported_generation_methods: vec!["generateContent".into(), "countTokens".into()],
            ..model
        };
        assert!(model.supports_generate_content());
    }

    #[tokio::test]
    async fn test_generate_content_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"An amphora."}]}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let text = client
            .generate_content(&[ContentPart::Text("hello".into())])
            .await
            .unwrap();

        assert_eq!(text, "An amphora.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_content_maps_errors() {
        let mut server = mockito::Server::new_async().await;
        let _auth = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate_content(&[ContentPart::Text("hello".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, CuratorError::Auth(ref m) if m == "Permission denied"));
    }

    #[tokio::test]
    async fn test_generate_content_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _quota = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("quota exceeded")
            .create_async()
            .await;

        let err = client_for(&server)
            .generate_content(&[ContentPart::Text("hello".into())])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CuratorError::RateLimited { retry_after: Some(d) } if d.as_secs() == 7
        ));
    }

    #[tokio::test]
    async fn test_list_models_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/v1beta/models")
            .match_query(Matcher::Regex("^pageSize=50$".into()))
            .with_status(200)
            .with_body(
                r#"{"models":[{"name":"models/gemini-2.5-flash","displayName":"Gemini 2.5 Flash",
                    "supportedGenerationMethods":["generateContent","countTokens"]}],
                    "nextPageToken":"page-2"}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/v1beta/models")
            .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
            .with_status(200)
            .with_body(
                r#"{"models":[{"name":"models/embedding-001","displayName":"Embedding 001",
                    "supportedGenerationMethods":["embedContent"]}]}"#,
            )
            .create_async()
            .await;

        let models = client_for(&server).list_models().await.unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "models/gemini-2.5-flash");
        assert_eq!(models[0].display_name, "Gemini 2.5 Flash");
        assert!(models[0].supports_generate_content());
        assert!(!models[1].supports_generate_content());
        first.assert_async().await;
        second.assert_async().await;
    }
}
