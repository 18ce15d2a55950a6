use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Used when a failed response doesn't carry an `error.message`.
pub const DEFAULT_FAILURE_MESSAGE: &str = "API request failed";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Where completions are sent and how the app identifies itself to
/// OpenRouter.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub api_hostname: String,
    pub referer: String,
    pub title: String,
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("{0}")]
    RequestFailed(String),

    /// Non-success status. Displays the message from the response body
    /// verbatim.
    #[error("{message}")]
    EndpointError { status: StatusCode, message: String },

    #[error("{0}")]
    MalformedResponse(String),
}

/// The single seam the chat controller calls to get the next reply.
#[async_trait]
pub trait CompletionBackend {
    async fn complete(
        &self,
        messages: &[Message],
        api_key: &str,
        model: &str,
    ) -> Result<String, CompletionError>;
}

pub type BoxedBackend = Box<dyn CompletionBackend + Send + Sync + 'static>;

pub struct OpenRouter {
    endpoint: Endpoint,
}

impl OpenRouter {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl CompletionBackend for OpenRouter {
    async fn complete(
        &self,
        messages: &[Message],
        api_key: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        completion(messages, &self.endpoint, api_key, model).await
    }
}

/// Sends the whole transcript to the chat completions endpoint and
/// returns the content of the first choice.
///
/// No timeout is set so a request runs until the transport gives up.
pub async fn completion(
    messages: &[Message],
    endpoint: &Endpoint,
    api_key: &str,
    model: &str,
) -> Result<String, CompletionError> {
    let payload = json!({
        "model": model,
        "messages": messages,
    });
    let url = format!(
        "{}/v1/chat/completions",
        endpoint.api_hostname.trim_end_matches("/")
    );

    tracing::debug!("Sending {} messages to {} using {}", messages.len(), url, model);

    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .header("HTTP-Referer", &endpoint.referer)
        .header("X-Title", &endpoint.title)
        .json(&payload)
        .send()
        .await
        .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

    if !status.is_success() {
        return Err(CompletionError::EndpointError {
            status,
            message: error_message(&body),
        });
    }

    reply_content(&body)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|resp| resp["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}

fn reply_content(body: &str) -> Result<String, CompletionError> {
    let resp: Value = serde_json::from_str(body).map_err(|e| {
        CompletionError::MalformedResponse(format!("Response was not valid JSON: {}", e))
    })?;

    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| {
            tracing::error!("No message content in response: {}", resp);
            CompletionError::MalformedResponse(String::from(
                "Response did not include a message",
            ))
        })
}
