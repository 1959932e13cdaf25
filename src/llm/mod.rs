//! Chat completion client for OpenAI-compatible endpoints

pub mod retry;
mod types;

pub use retry::RetryPolicy;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall, FunctionDefinition, ToolCall,
    ToolDefinition, Usage,
};

use crate::{Error, Result};

/// Chat completion client
///
/// Talks to any OpenAI-compatible `/chat/completions` endpoint and
/// retries recoverable failures with exponential backoff.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("API key required for chat".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            policy: RetryPolicy::default(),
        })
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Request a chat completion
    ///
    /// Recoverable failures (429, 5xx, transport errors) are retried
    /// with exponential backoff; anything else surfaces immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails after all retries
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut attempt = 0;

        loop {
            match self.send_once(&url, request).await {
                Ok(response) => return Ok(response),
                Err(SendError::Fatal(e)) => return Err(e),
                Err(SendError::Recoverable { message, retry_after }) => {
                    if attempt >= self.policy.max_retries {
                        tracing::error!(attempts = attempt + 1, "chat request exhausted retries");
                        return Err(Error::Llm(message));
                    }

                    let delay = retry::delay_for_attempt(&self.policy, attempt, retry_after);
                    tracing::warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %message,
                        "chat request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Perform a single request attempt
    async fn send_once(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResponse, SendError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| SendError::Recoverable {
                message: format!("chat request failed: {e}"),
                retry_after: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry::parse_retry_after(
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok()),
            );
            let body = response.text().await.unwrap_or_default();
            let message = format!("chat API error {status}: {body}");

            if retry::is_recoverable(status.as_u16(), &body) {
                return Err(SendError::Recoverable {
                    message,
                    retry_after,
                });
            }

            tracing::error!(status = %status, body = %body, "chat API error");
            return Err(SendError::Fatal(Error::Llm(message)));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse chat response");
            SendError::Fatal(Error::Llm(format!("invalid chat response: {e}")))
        })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion received"
            );
        }

        Ok(parsed)
    }
}

/// Internal classification of a failed attempt
enum SendError {
    Recoverable {
        message: String,
        retry_after: Option<std::time::Duration>,
    },
    Fatal(Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_api_key() {
        let result = ChatClient::new("https://api.openai.com/v1".to_string(), String::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client =
            ChatClient::new("https://api.openai.com/v1/".to_string(), "sk-test".to_string())
                .unwrap();
        assert_eq!(client.base_url, "https://api.openai.com/v1");
    }
}
