//! Ollama LLM client, spoken over its OpenAI-compatible chat endpoint.
//!
//! Any server exposing `/v1/chat/completions` works; the optional API key is
//! sent as a bearer token for hosted gateways.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole,
};

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model for Ollama.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Transport ceiling. The battle engine enforces its own, much shorter, bound.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on how much of an error body ends up in a log line.
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request. Blank keys are ignored.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completion_body<'a>(&'a self, request: &'a LlmRequest) -> CompletionBody<'a> {
        let system = request
            .system_prompt
            .as_deref()
            .map(|content| WireMessage {
                role: "system",
                content,
            });
        let turns = request.messages.iter().map(|msg| WireMessage {
            role: role_name(msg.role),
            content: &msg.content,
        });

        CompletionBody {
            model: &self.model,
            messages: system.into_iter().chain(turns).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_output
                .then_some(ResponseFormat { kind: "json_object" }),
            stream: false,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL)
    }
}

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

fn status_error(status: StatusCode, body: &str) -> LlmError {
    let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    LlmError::RequestFailed(format!("HTTP {}: {}", status.as_u16(), body))
}

#[async_trait]
impl LlmPort for OllamaClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut call = self
            .http
            .post(&self.endpoint)
            .json(&self.completion_body(&request));
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        completion.into_response()
    }
}

// Wire types for the chat completion endpoint

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Completion {
    fn into_response(self) -> Result<LlmResponse, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("completion has no choices".into()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::ChatMessage;

    #[test]
    fn body_puts_system_prompt_first_and_asks_for_json() {
        let client = OllamaClient::new("http://llm.local/", "tiny");
        let request = LlmRequest::new(vec![ChatMessage::user("hit it")])
            .with_system_prompt("be brief")
            .expect_json();

        let body = serde_json::to_value(client.completion_body(&request)).unwrap();

        assert_eq!(body["model"], "tiny");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hit it");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["stream"], false);
        assert!(body.get("temperature").is_none());
        assert_eq!(client.endpoint, "http://llm.local/v1/chat/completions");
    }

    #[test]
    fn assistant_turns_keep_their_role() {
        let client = OllamaClient::default();
        let request = LlmRequest::new(vec![
            ChatMessage::user("example"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("real"),
        ]);
        let body = serde_json::to_value(client.completion_body(&request)).unwrap();

        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][2]["content"], "real");
    }

    #[test]
    fn plain_request_has_no_response_format() {
        let client = OllamaClient::default();
        let request = LlmRequest::new(vec![ChatMessage::user("hi")]).with_temperature(0.5);
        let body = serde_json::to_value(client.completion_body(&request)).unwrap();

        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn empty_choices_is_invalid() {
        let completion: Completion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            completion.into_response(),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn first_choice_wins() {
        let completion: Completion = serde_json::from_str(
            r#"{"choices":[
                {"message":{"role":"assistant","content":"Pow!"},"finish_reason":"length"},
                {"message":{"role":"assistant","content":"Zap!"}}
            ]}"#,
        )
        .unwrap();
        let response = completion.into_response().unwrap();
        assert_eq!(response.content, "Pow!");
        assert_eq!(response.finish_reason, FinishReason::Length);
    }

    #[test]
    fn error_body_is_truncated() {
        let long = "x".repeat(1000);
        let LlmError::RequestFailed(message) = status_error(StatusCode::BAD_GATEWAY, &long) else {
            panic!("wrong variant");
        };
        assert!(message.starts_with("HTTP 502: "));
        assert!(message.len() < 300);
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let client = OllamaClient::default().with_api_key(Some("  ".into()));
        assert!(client.api_key.is_none());
        assert_eq!(client.model(), DEFAULT_OLLAMA_MODEL);
    }
}
