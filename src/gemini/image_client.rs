use std::sync::Arc;

use crate::{
    config::GeminiConfig,
    error::{IconError, Result},
    gemini::transport::{ContentTransport, HttpTransport},
    logger,
    models::{GenerateContentRequest, GenerateContentResponse, GenerationRequest},
};

#[derive(Clone)]
pub struct GeminiImageClient {
    config: GeminiConfig,
    transport: Arc<dyn ContentTransport>,
}

impl GeminiImageClient {
    pub fn new(config: GeminiConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(&config));
        Self { config, transport }
    }

    pub fn with_transport(config: GeminiConfig, transport: Arc<dyn ContentTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// (id, name, provider) of the image-capable models this client can drive.
    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (
                "gemini-2.5-flash-image-preview",
                "Gemini 2.5 Flash Image (preview)",
                "Google",
            ),
            ("gemini-2.5-flash-image", "Gemini 2.5 Flash Image", "Google"),
            (
                "gemini-2.0-flash-preview-image-generation",
                "Gemini 2.0 Flash Image Generation (preview)",
                "Google",
            ),
        ]
    }

    /// Generates one icon and returns it as a `data:` URI.
    ///
    /// Empty input and a missing API key are rejected before any request is
    /// sent. A single attempt is made; retrying is up to the caller.
    pub async fn generate_icon(&self, nickname: &str, style: &str) -> Result<String> {
        let request = match GenerationRequest::new(nickname, style) {
            Ok(request) => request,
            Err(e) => {
                log::error!("Rejected icon request for '{}': {}", nickname, e);
                return Err(e);
            }
        };

        let result = self.attempt(&request).await;
        if let Err(e) = &result {
            log::error!(
                "Gemini image generation failed [attempt {}]: {}",
                request.attempt_id,
                e
            );
        }
        result
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                IconError::ConfigError(
                    "The GEMINI_API_KEY environment variable is not set.".into(),
                )
            })?;

        let payload = GenerateContentRequest::image_prompt(
            request.prompt(),
            self.config.aspect_ratio.as_deref(),
        );

        log::info!(
            "Generating icon for '{}' with model: {} [attempt {}]",
            request.nickname,
            self.config.model,
            request.attempt_id
        );

        let _timer = logger::timer(&format!("icon generation {}", request.attempt_id));
        let response = self
            .transport
            .generate_content(api_key, &self.config.model, &payload)
            .await?;

        extract_image(response)
    }
}

/// Turns a `generateContent` response into a data URI or the matching error.
pub fn extract_image(response: GenerateContentResponse) -> Result<String> {
    let candidate = match response.candidates.first() {
        Some(candidate) => candidate,
        None => {
            if let Some(feedback) = &response.prompt_feedback {
                if let Some(reason) = &feedback.block_reason {
                    let detail = match &feedback.block_reason_message {
                        Some(message) => format!("{} ({})", reason, message),
                        None => reason.clone(),
                    };
                    return Err(IconError::SafetyBlocked(detail));
                }
            }

            return match response.text.filter(|text| !text.trim().is_empty()) {
                Some(text) => Err(IconError::TextOnlyResponse(text)),
                None => Err(IconError::EmptyResult),
            };
        }
    };

    match candidate.first_inline_data() {
        Some(inline) => Ok(inline.to_data_uri()),
        None => {
            if let Some(text) = candidate.text() {
                log::debug!("Candidate carried text but no image: {}", text);
            }
            if let Some(reason) = &candidate.finish_reason {
                log::debug!("Candidate finish reason: {}", reason);
            }
            Err(IconError::NoImage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeTransport {
        reply: Value,
        fail_status: Option<u16>,
        calls: AtomicUsize,
        last: Mutex<Option<(String, String, Value)>>,
    }

    impl FakeTransport {
        fn replying(reply: Value) -> Arc<Self> {
            Arc::new(Self {
                reply,
                fail_status: None,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn failing(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                reply: body,
                fail_status: Some(status),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentTransport for FakeTransport {
        async fn generate_content(
            &self,
            api_key: &str,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((
                api_key.to_string(),
                model.to_string(),
                serde_json::to_value(request).unwrap(),
            ));
            if let Some(status) = self.fail_status {
                return Err(crate::gemini::transport::api_error(
                    status,
                    &self.reply.to_string(),
                ));
            }
            Ok(serde_json::from_value(self.reply.clone()).unwrap())
        }
    }

    fn client(transport: Arc<FakeTransport>) -> GeminiImageClient {
        GeminiImageClient::with_transport(GeminiConfig::new().with_api_key("test-key"), transport)
    }

    fn image_reply(mime: &str, data: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": mime, "data": data}}]}
            }]
        })
    }

    #[tokio::test]
    async fn test_returns_data_uri() {
        let transport = FakeTransport::replying(image_reply("image/png", "ABC123"));
        let uri = client(transport.clone())
            .generate_icon("Dark Knight", "Cyberpunk style")
            .await
            .unwrap();

        assert_eq!(uri, "data:image/png;base64,ABC123");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_sends_prompt_key_and_model() {
        let transport = FakeTransport::replying(image_reply("image/png", "ABC123"));
        client(transport.clone())
            .generate_icon("Neo", "Retro style, pixel art")
            .await
            .unwrap();

        let (api_key, model, body) = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(api_key, "test-key");
        assert_eq!(model, crate::config::DEFAULT_MODEL);
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("'Neo'"));
        assert!(prompt.contains("Retro style, pixel art"));
        assert_eq!(body["generationConfig"]["candidateCount"], 1);
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_network() {
        let transport = FakeTransport::replying(image_reply("image/png", "ABC123"));
        let client = client(transport.clone());

        let err = client.generate_icon("", "Cyberpunk").await.unwrap_err();
        assert!(matches!(err, IconError::ValidationError(_)));
        let err = client.generate_icon("Neo", "").await.unwrap_err();
        assert!(matches!(err, IconError::ValidationError(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let transport = FakeTransport::replying(image_reply("image/png", "ABC123"));
        let client = GeminiImageClient::with_transport(GeminiConfig::new(), transport.clone());

        let err = client.generate_icon("Neo", "Cyberpunk").await.unwrap_err();
        assert!(matches!(err, IconError::ConfigError(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_safety_block_surfaces_reason() {
        let transport = FakeTransport::replying(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        let err = client(transport)
            .generate_icon("Neo", "Cyberpunk")
            .await
            .unwrap_err();

        assert!(matches!(err, IconError::SafetyBlocked(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_candidate_without_image() {
        let transport = FakeTransport::replying(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't draw that."}]}}]
        }));
        let err = client(transport)
            .generate_icon("Neo", "Cyberpunk")
            .await
            .unwrap_err();

        assert!(matches!(err, IconError::NoImage));
        assert!(err.to_string().contains("Could not generate an image"));
    }

    #[tokio::test]
    async fn test_api_error_is_propagated() {
        let transport = FakeTransport::failing(
            403,
            json!({"error": {"code": 403, "message": "Permission denied."}}),
        );
        let err = client(transport)
            .generate_icon("Neo", "Cyberpunk")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error (403): Permission denied.");
    }

    #[test]
    fn test_extract_text_only_and_empty() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"text": "Try another nickname"})).unwrap();
        match extract_image(response) {
            Err(IconError::TextOnlyResponse(text)) => assert_eq!(text, "Try another nickname"),
            other => panic!("unexpected result: {:?}", other),
        }

        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(extract_image(response), Err(IconError::EmptyResult)));
    }

    #[test]
    fn test_extract_block_reason_with_message() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "OTHER", "blockReasonMessage": "policy"}
        }))
        .unwrap();
        let err = extract_image(response).unwrap_err();
        assert_eq!(err.to_string(), "Generation blocked by the API: OTHER (policy)");
    }

    #[test]
    fn test_extract_skips_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Sure!"},
                {"inlineData": {"mimeType": "image/jpeg", "data": "XYZ"}},
                {"inlineData": {"mimeType": "image/png", "data": "SECOND"}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(extract_image(response).unwrap(), "data:image/jpeg;base64,XYZ");
    }

    #[test]
    fn test_supported_models_include_default() {
        assert!(GeminiImageClient::supported_models()
            .iter()
            .any(|(id, _, _)| *id == crate::config::DEFAULT_MODEL));
    }

    #[test]
    fn test_extract_ignores_non_image_payloads() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "text/plain", "data": "aGk="}}
            ]}}]
        }))
        .unwrap();
        assert!(matches!(extract_image(response), Err(IconError::NoImage)));
    }
}
