//! Reaction text generation.
//!
//! A thin facade over a completion provider that turns a user message (or a
//! tool invocation) into one short natural-language line for the
//! placeholder. Every call is bounded by a timeout and degrades to `None`
//! on any failure; the indicator shows its canned text instead.

use super::openai::OpenAiCompatible;
use super::provider::{ChatMessage, CompletionProvider, CompletionRequest, text_of};
use crate::config::ReactionConfig;
use crate::personality::{PERSONALITY_CHAR_BUDGET, load_personality, truncate_on_boundary};
use crate::util::compact_json;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Character budget for history prepended to the user content.
pub const HISTORY_CHAR_BUDGET: usize = 1000;

/// Character budget for serialized tool arguments.
const TOOL_ARGS_CHARS: usize = 200;

const DEFAULT_REACTION_PROMPT: &str = "You are a chat assistant that just received a message and \
is about to work on it. Reply with one short, casual acknowledgment in the language of the \
message. One line, no quotes, no emoji spam.";

const TOOL_NARRATION_PROMPT: &str = "You narrate what an assistant is currently doing with a \
tool. Given a tool name and its arguments, reply with one short, natural present-tense line \
describing the action. One line, no quotes.";

/// One prior message of conversation context, rendered as `sender: body`.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Who sent the message.
    pub sender: String,
    /// Message text.
    pub body: String,
}

impl HistoryEntry {
    /// Create a history entry.
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }
}

/// Source of refined placeholder text, consumed by the indicator.
///
/// Both operations are best-effort: `None` means "keep whatever is
/// displayed". Implementations must never block indefinitely.
#[async_trait]
pub trait ReactionSource: Send + Sync {
    /// A short reaction to a new user message.
    async fn reaction(&self, user_message: &str, history: &[HistoryEntry]) -> Option<String>;

    /// A short description of a tool invocation.
    async fn tool_description(&self, tool_name: &str, args: Option<&Value>) -> Option<String>;
}

/// Generates reaction text through a completion provider.
pub struct ReactionGenerator {
    config: ReactionConfig,
    provider: Arc<dyn CompletionProvider>,
    persona: Option<String>,
}

impl std::fmt::Debug for ReactionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReactionGenerator {
    /// Create a generator over an explicit provider.
    ///
    /// Explicit personality text from the config is adopted immediately;
    /// see [`Self::with_personality_dir`] for file-based personas.
    pub fn new(config: ReactionConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let persona = config
            .personality
            .as_deref()
            .map(|text| truncate_on_boundary(text, PERSONALITY_CHAR_BUDGET));
        Self {
            config,
            provider,
            persona,
        }
    }

    /// Create a generator with the default OpenAI-compatible provider,
    /// wired from the config's provider name and timeout.
    #[must_use]
    pub fn for_config(config: ReactionConfig) -> Self {
        let provider = OpenAiCompatible::new(config.provider.clone())
            .with_timeout(Duration::from_millis(config.timeout_ms));
        Self::new(config, Arc::new(provider))
    }

    /// Load a persona from `<agent_dir>/personality.md` unless the config
    /// already carries explicit personality text or a system prompt.
    pub async fn with_personality_dir(mut self, agent_dir: &Path) -> Self {
        if self.persona.is_none() && self.config.system_prompt.is_none() {
            self.persona = load_personality(agent_dir).await;
        }
        self
    }

    /// The system prompt used for message reactions.
    fn reaction_system_prompt(&self) -> String {
        if let Some(prompt) = &self.config.system_prompt {
            return prompt.clone();
        }
        match &self.persona {
            Some(persona) => format!("{DEFAULT_REACTION_PROMPT}\n\nYour persona:\n{persona}"),
            None => DEFAULT_REACTION_PROMPT.to_string(),
        }
    }

    /// Render history lines plus the new message, newest history last,
    /// never exceeding [`HISTORY_CHAR_BUDGET`] of history.
    fn render_content(history: &[HistoryEntry], user_message: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut used = 0usize;

        for entry in history.iter().rev() {
            let line = format!("{}: {}", entry.sender, entry.body);
            let cost = line.chars().count() + 1;
            if used + cost > HISTORY_CHAR_BUDGET {
                break;
            }
            used += cost;
            lines.push(line);
        }
        lines.reverse();

        if lines.is_empty() {
            user_message.to_string()
        } else {
            format!("{}\n\n{}", lines.join("\n"), user_message)
        }
    }

    /// One bounded completion call; any failure or timeout yields `None`.
    async fn call(&self, system: String, content: String) -> Option<String> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            system: Some(system),
            messages: vec![ChatMessage::user(content)],
            max_tokens: self.config.max_tokens,
        };

        let deadline = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(deadline, self.provider.complete(&request)).await {
            Ok(Ok(blocks)) => text_of(&blocks),
            Ok(Err(e)) => {
                debug!(provider = %self.provider.name(), error = %e, "generation failed");
                None
            }
            Err(_) => {
                debug!(
                    provider = %self.provider.name(),
                    timeout_ms = self.config.timeout_ms,
                    "generation timed out"
                );
                None
            }
        }
    }

    /// Generate a short reaction to a user message.
    pub async fn generate_reaction(
        &self,
        user_message: &str,
        history: &[HistoryEntry],
    ) -> Option<String> {
        let system = self.reaction_system_prompt();
        let content = Self::render_content(history, user_message);
        self.call(system, content).await
    }

    /// Generate a short description of a tool invocation.
    pub async fn generate_tool_description(
        &self,
        tool_name: &str,
        args: Option<&Value>,
    ) -> Option<String> {
        let content = match args {
            Some(args) if !args.is_null() => {
                format!("Tool: {tool_name}\nArguments: {}", compact_json(args, TOOL_ARGS_CHARS))
            }
            _ => format!("Tool: {tool_name}"),
        };
        self.call(TOOL_NARRATION_PROMPT.to_string(), content).await
    }
}

#[async_trait]
impl ReactionSource for ReactionGenerator {
    async fn reaction(&self, user_message: &str, history: &[HistoryEntry]) -> Option<String> {
        self.generate_reaction(user_message, history).await
    }

    async fn tool_description(&self, tool_name: &str, args: Option<&Value>) -> Option<String> {
        self.generate_tool_description(tool_name, args).await
    }
}
