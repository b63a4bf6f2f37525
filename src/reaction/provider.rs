//! Completion provider trait and common types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for completion provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// API key not configured for the provider.
    #[error("API key not configured for provider: {0}")]
    MissingApiKey(String),
    /// Provider name has no known endpoint and no base URL was given.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// The provider returned an error response.
    #[error("API error: {0}")]
    Api(String),
    /// Request construction or transport error.
    #[error("request error: {0}")]
    Request(String),
}

/// Result type for completion provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A single message in a structured conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("user", "assistant").
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A bounded completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Optional system prompt.
    pub system: Option<String>,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Output-token budget.
    pub max_tokens: u32,
}

/// A typed block of completion output.
///
/// Only text blocks are consumed by this crate; other kinds are carried
/// through untouched so providers can surface them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text output.
    Text {
        /// The text.
        text: String,
    },
    /// Structured output.
    Json {
        /// The value.
        value: serde_json::Value,
    },
}

/// Concatenate the text blocks of a completion result.
///
/// Returns `None` when no non-whitespace text is present.
#[must_use]
pub fn text_of(blocks: &[ContentBlock]) -> Option<String> {
    let mut out = String::new();
    for block in blocks {
        if let ContentBlock::Text { text } = block {
            out.push_str(text);
        }
    }
    let out = out.trim();
    if out.is_empty() {
        None
    } else {
        Some(out.to_string())
    }
}

/// Trait for language-model completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Whether the provider is configured and ready.
    fn is_available(&self) -> bool;

    /// Issue a single completion call.
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Vec<ContentBlock>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_concatenates_and_trims() {
        let blocks = vec![
            ContentBlock::Text {
                text: "  hey".to_string(),
            },
            ContentBlock::Json {
                value: serde_json::json!({"ignored": true}),
            },
            ContentBlock::Text {
                text: " there  ".to_string(),
            },
        ];
        assert_eq!(text_of(&blocks), Some("hey there".to_string()));
    }

    #[test]
    fn test_text_of_empty_is_none() {
        assert_eq!(text_of(&[]), None);
        let blocks = vec![ContentBlock::Text {
            text: "   ".to_string(),
        }];
        assert_eq!(text_of(&blocks), None);
    }

    #[test]
    fn test_content_block_serde_tag() {
        let block = ContentBlock::Text {
            text: "hi".to_string(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);
    }
}
