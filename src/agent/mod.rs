//! The tool-augmented conversational dispatch loop
//!
//! Turns free-form questions into structured database lookups and back
//! into short grounded answers: the model picks tools, the executor
//! runs them, and their results are fed back until the model produces
//! a plain answer.

mod prompt;

pub use prompt::build_system_prompt;

use crate::db::{Message, MessageRole};
use crate::llm::{ChatClient, ChatMessage, ChatRequest};
use crate::tools::ToolExecutor;
use crate::Result;

/// Default agent name
pub const AGENT_NAME: &str = "Nova";

/// Max tool call rounds per turn; stops runaway call chains
const MAX_TOOL_ROUNDS: u32 = 10;

/// Spoken when the chat backend is unreachable after retries
const FALLBACK_REPLY: &str = "I am sorry, I am having trouble accessing the database right now.";

/// The customer-support agent
pub struct SupportAgent {
    client: ChatClient,
    executor: ToolExecutor,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SupportAgent {
    /// Create a new support agent
    #[must_use]
    pub fn new(client: ChatClient, executor: ToolExecutor, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            executor,
            model,
            max_tokens,
            system_prompt: build_system_prompt(AGENT_NAME),
        }
    }

    /// Answer a user turn, given the persisted conversation history
    ///
    /// This never fails toward the caller: transport errors degrade to
    /// a fixed apology so the voice loop keeps running.
    pub async fn respond(&self, history: &[Message], user_text: &str) -> String {
        match self.run_dispatch(history, user_text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "agent turn failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Run the dispatch loop for one turn
    ///
    /// # Errors
    ///
    /// Returns error if the chat backend fails after retries
    async fn run_dispatch(&self, history: &[Message], user_text: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&self.system_prompt));
        for msg in history {
            messages.push(match msg.role {
                MessageRole::User => ChatMessage::user(&msg.content),
                MessageRole::Assistant => ChatMessage::assistant(&msg.content),
            });
        }
        messages.push(ChatMessage::user(user_text));

        let tools = ToolExecutor::definitions();
        let mut final_text = String::new();

        for round in 0..MAX_TOOL_ROUNDS {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: Some(tools.clone()),
                tool_choice: None,
                max_tokens: Some(self.max_tokens),
                temperature: None,
            };

            let response = self.client.complete(&request).await?;
            let Some(choice) = response.choices.first() else {
                break;
            };

            // Overwrite each round so only the final answer is spoken
            if let Some(text) = &choice.message.content {
                final_text.clone_from(text);
            }

            let tool_calls = choice
                .message
                .tool_calls
                .as_ref()
                .filter(|_| choice.finish_reason.as_deref() == Some("tool_calls"));

            let Some(tool_calls) = tool_calls else {
                break;
            };

            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: choice.message.content.clone(),
                tool_calls: Some(tool_calls.clone()),
                tool_call_id: None,
            });

            for call in tool_calls {
                let result = self
                    .executor
                    .execute(&call.function.name, &call.function.arguments)
                    .unwrap_or_else(|e| format!("Error: {e}"));

                tracing::info!(
                    round,
                    tool = %call.function.name,
                    result_len = result.len(),
                    "tool executed"
                );

                messages.push(ChatMessage::tool(&call.id, &result));
            }
        }

        Ok(final_text)
    }
}
