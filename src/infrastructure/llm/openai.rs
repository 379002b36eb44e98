use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// Provider for any endpoint speaking the OpenAI chat completions protocol
/// (OpenAI itself, Mistral, and self-hosted gateways)
#[derive(Debug)]
pub struct OpenAiCompatibleProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    auth_header: Option<String>,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiCompatibleProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, "openai", api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn mistral(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, "mistral", api_key, DEFAULT_MISTRAL_BASE_URL)
    }

    /// An empty API key sends no `Authorization` header
    pub fn with_base_url(
        client: C,
        name: &'static str,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        let auth_header = (!api_key.is_empty()).then(|| format!("Bearer {}", api_key));
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            name,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<ChatMessage> = request.messages.iter().map(ChatMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if let Some(ref stop) = request.stop {
            body["stop"] = serde_json::json!(stop);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: ChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.name, "No choices in response"))?;

        // A null content is an empty completion, not a failure
        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(FinishReason::parse(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiCompatibleProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => DomainError::provider(self.name, message),
                other => other,
            })?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::HttpClient;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str = "https://api.mistral.ai/v1/chat/completions";

    fn completion(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "cmpl-123",
            "model": "mistral-large-latest",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18 }
        })
    }

    #[tokio::test]
    async fn test_mistral_chat() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, completion(serde_json::json!("YES")));
        let provider = OpenAiCompatibleProvider::mistral(client, "test-api-key");

        let request = LlmRequest::completion("Is the sky blue?", 10, 0.0);
        let response = provider.chat("mistral-large-latest", request).await.unwrap();

        assert_eq!(response.id, "cmpl-123");
        assert_eq!(response.content(), Some("YES"));
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 18);
        assert_eq!(provider.provider_name(), "mistral");
    }

    #[tokio::test]
    async fn test_request_body_carries_sampling_settings() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, completion(serde_json::json!("ok")));
        let provider = OpenAiCompatibleProvider::mistral(client, "k");

        provider
            .chat("m", LlmRequest::completion("hi", 300, 0.3))
            .await
            .unwrap();

        let bodies = provider.client.bodies();
        let body = &bodies[0];
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_null_content_is_empty_completion() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, completion(serde_json::Value::Null));
        let provider = OpenAiCompatibleProvider::mistral(client, "k");

        let response = provider
            .chat("m", LlmRequest::completion("hi", 10, 0.0))
            .await
            .unwrap();

        assert_eq!(response.content(), None);
    }

    #[tokio::test]
    async fn test_error_is_tagged_with_provider_name() {
        let client = MockHttpClient::new().with_error(TEST_URL, "API key invalid");
        let provider = OpenAiCompatibleProvider::mistral(client, "invalid-key");

        let err = provider
            .chat("m", LlmRequest::completion("hi", 10, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Provider { ref provider, .. } if provider == "mistral"));
    }

    #[tokio::test]
    async fn test_no_choices_is_error() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({ "id": "x", "model": "m", "choices": [] }));
        let provider = OpenAiCompatibleProvider::mistral(client, "k");

        let result = provider.chat("m", LlmRequest::completion("hi", 10, 0.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({ "model": "local-model" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(serde_json::json!("CAN_ANSWER"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatibleProvider::with_base_url(HttpClient::new(), "custom", "secret", server.uri());

        let response = provider
            .chat("local-model", LlmRequest::completion("q", 10, 0.0))
            .await
            .unwrap();

        assert_eq!(response.content(), Some("CAN_ANSWER"));
    }
}
