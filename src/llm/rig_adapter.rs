//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::message::{AssistantContent, Message};
use rig::completion::{CompletionError, CompletionModel, CompletionRequestBuilder};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role,
};

/// Sent when the history has no leading user turn; chat APIs expect the
/// conversation to open with one.
const KICKOFF_MESSAGE: &str = "Please begin.";

/// `LlmProvider` over any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M> RigAdapter<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let Turns { preamble, mut turns } = split_turns(&request.messages);
        let Some((prompt_role, prompt_text)) = turns.pop() else {
            return Err(LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: "conversation has no turns".to_string(),
            });
        };

        let history: Vec<Message> = turns
            .into_iter()
            .map(|(role, text)| to_rig_message(role, text))
            .collect();
        let mut builder =
            CompletionRequestBuilder::new(self.model.clone(), to_rig_message(prompt_role, prompt_text))
                .messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }

        tracing::debug!(
            provider = self.provider,
            model = %self.model_name,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .model
            .completion(builder.build())
            .await
            .map_err(|e| map_completion_error(self.provider, e))?;

        let content = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.to_string(),
                reason: "response contained no text".to_string(),
            });
        }

        let input_tokens = saturating_u32(response.usage.input_tokens);
        let output_tokens = saturating_u32(response.usage.output_tokens);
        tracing::debug!(input_tokens, output_tokens, "Completion received");

        Ok(CompletionResponse {
            content,
            input_tokens,
            output_tokens,
        })
    }
}

/// System messages folded into a preamble, the rest in order.
#[derive(Debug, PartialEq)]
struct Turns<'a> {
    preamble: Option<String>,
    turns: Vec<(Role, &'a str)>,
}

fn split_turns(messages: &[ChatMessage]) -> Turns<'_> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let mut turns: Vec<(Role, &str)> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    if turns.first().map(|(role, _)| *role) != Some(Role::User) {
        turns.insert(0, (Role::User, KICKOFF_MESSAGE));
    }

    Turns {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        turns,
    }
}

fn to_rig_message(role: Role, text: &str) -> Message {
    match role {
        Role::Assistant => Message::assistant(text),
        Role::User | Role::System => Message::user(text),
    }
}

fn map_completion_error(provider: &str, err: CompletionError) -> LlmError {
    match err {
        CompletionError::ProviderError(message) => classify_provider_error(provider, message),
        CompletionError::ResponseError(reason) => LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason,
        },
        CompletionError::JsonError(e) => LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: e.to_string(),
        },
        other => LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Provider errors carry the upstream status and body as text.
fn classify_provider_error(provider: &str, message: String) -> LlmError {
    let lower = message.to_lowercase();
    if ["401", "403", "authentication", "invalid api key", "invalid x-api-key"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        LlmError::AuthFailed {
            provider: provider.to_string(),
        }
    } else if ["429", "rate limit", "rate_limit"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        LlmError::RateLimited {
            provider: provider.to_string(),
            retry_after: None,
        }
    } else {
        LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: message,
        }
    }
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
