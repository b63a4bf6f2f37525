//! Pensive - transient "thinking" placeholder messages for chat bots.
//!
//! While an LLM-powered bot works on a request, the user sees nothing. This
//! crate fills that gap with a placeholder message ("🤔 Thinking...") that
//! is sent when processing starts, rewritten as the agent invokes tools
//! ("📖 Reading notes.txt..."), optionally replaced by a model-generated
//! reaction, and deleted once the real response lands.
//!
//! # Architecture
//!
//! - **Indicator** ([`indicator`]) - per-conversation placeholder lifecycle
//! - **Display** ([`display`]) - tool invocation to status text dispatch
//! - **Registry** ([`registry`]) - conversation-keyed store of live placeholders
//! - **Transport** ([`transport`], [`transports`]) - platform send/edit/delete
//! - **Reaction** ([`reaction`]) - bounded LLM calls for smarter text
//! - **Personality** ([`personality`]) - persona text for generated reactions
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pensive::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let transport = Arc::new(TelegramTransport::new("YOUR_BOT_TOKEN"));
//! let registry = PlaceholderRegistry::new();
//!
//! let indicator = TypingIndicator::new(
//!     IndicatorConfig::enabled(),
//!     transport,
//!     registry,
//!     "123456789",
//! );
//!
//! indicator.start(Some("what's the weather?"), &[]).await;
//! indicator.on_tool("fetch", Some(&serde_json::json!({"url": "https://wttr.in"}))).await;
//! // ... agent produces the real response ...
//! indicator.cleanup().await;
//! # }
//! ```
//!
//! Placeholder delivery is strictly best-effort: every transport or
//! generation failure is logged and swallowed, and the bot keeps working
//! without the cosmetic layer.
//!
//! # Features
//!
//! - `telegram` (default) - Telegram transport via teloxide

// Core modules
pub mod config;
pub mod display;
pub mod error;
pub mod indicator;
pub mod registry;
pub mod transport;
pub mod util;

// Collaborator implementations
pub mod personality;
pub mod reaction;
pub mod transports;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        ConfigError, ConfigResult, PensiveError, Result, TransportError, TransportResult,
    };

    // Indicator
    pub use crate::indicator::TypingIndicator;

    // Config
    pub use crate::config::{
        ConfigIssue, DEFAULT_MESSAGES, IndicatorConfig, IssueLevel, PensiveConfig,
        ReactionConfig, config_dir, config_path, init_config, load_config, save_config,
    };

    // Display
    pub use crate::display::{
        REACTION_EMOJI, REACTION_TOOL, ToolDisplayTable, ToolStyle, reaction_text,
    };

    // Registry
    pub use crate::registry::PlaceholderRegistry;

    // Transport
    pub use crate::transport::{MessageRef, SharedTransport, Transport};
    #[cfg(feature = "telegram")]
    pub use crate::transports::TelegramTransport;

    // Reaction
    pub use crate::reaction::{
        ChatMessage, CompletionProvider, CompletionRequest, ContentBlock, HistoryEntry,
        OpenAiCompatible, ProviderError, ProviderResult, ReactionGenerator, ReactionSource,
    };

    // Personality
    pub use crate::personality::{PERSONALITY_FILE, load_personality, truncate_on_boundary};

    // Utilities
    pub use crate::util::{compact_json, file_name_of, host_of, truncate_str};
}
