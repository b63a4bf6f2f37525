//! Configuration surface for the placeholder feature.
//!
//! Both the indicator and the reaction generator are configured through
//! plain serde structs so embedders can nest them in their own config
//! files. Helpers for a standalone JSON config file under `~/.pensive/` are
//! provided for hosts that want one.

use crate::display::ToolStyle;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Canned placeholder phrases used when none are configured.
pub const DEFAULT_MESSAGES: [&str; 3] = [
    "🤔 Thinking...",
    "🤔 Let me think...",
    "💭 Working on it...",
];

/// Default output-token budget for generated reactions.
pub const DEFAULT_MAX_TOKENS: u32 = 60;

/// Default deadline for a single generation call, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

// ============================================================================
// Indicator
// ============================================================================

/// Configuration for the placeholder indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Whether the feature is active. Disabled by default.
    pub enabled: bool,
    /// Placeholder phrases; one is picked at random per cycle.
    pub messages: Vec<String>,
    /// Whether to delete the placeholder once the real response is ready.
    pub delete_on_response: bool,
    /// Per-tool display styles for fallback status text.
    pub tool_display: HashMap<String, ToolStyle>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            messages: DEFAULT_MESSAGES.iter().map(|s| (*s).to_string()).collect(),
            delete_on_response: true,
            tool_display: HashMap::new(),
        }
    }
}

impl IndicatorConfig {
    /// Create a config with the feature enabled and everything else default.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Replace the placeholder phrases.
    #[must_use]
    pub fn messages(mut self, messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.messages = messages.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the placeholder is deleted on completion.
    #[must_use]
    pub const fn delete_on_response(mut self, delete: bool) -> Self {
        self.delete_on_response = delete;
        self
    }

    /// Add a display style for a tool.
    #[must_use]
    pub fn tool_style(
        mut self,
        tool: impl Into<String>,
        emoji: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.tool_display
            .insert(tool.into(), ToolStyle::new(emoji, label));
        self
    }
}

// ============================================================================
// Reaction generator
// ============================================================================

/// Configuration for the reaction text generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Whether smart reactions are generated. Disabled by default.
    pub enabled: bool,
    /// Completion provider name (e.g. "openai", "groq", "ollama").
    pub provider: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Output-token budget per call.
    pub max_tokens: u32,
    /// Deadline per call in milliseconds; the call is abandoned afterwards.
    pub timeout_ms: u64,
    /// Explicit personality text woven into the default prompt.
    pub personality: Option<String>,
    /// Full system prompt override; wins over any personality text.
    pub system_prompt: Option<String>,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            personality: None,
            system_prompt: None,
        }
    }
}

impl ReactionConfig {
    /// Create a config with generation enabled for the given provider/model.
    pub fn enabled(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            provider: provider.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the per-call deadline in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the output-token budget.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set explicit personality text.
    #[must_use]
    pub fn personality(mut self, text: impl Into<String>) -> Self {
        self.personality = Some(text.into());
        self
    }

    /// Set a full system prompt override.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

// ============================================================================
// Top-level config + file helpers
// ============================================================================

/// Complete configuration for the feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PensiveConfig {
    /// Placeholder indicator settings.
    pub indicator: IndicatorConfig,
    /// Reaction generator settings.
    pub reaction: ReactionConfig,
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Suspicious but workable.
    Warning,
    /// The affected feature cannot work as configured.
    Error,
}

/// A problem found while validating configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl ConfigIssue {
    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl PensiveConfig {
    /// Validate the configuration, returning all issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.indicator.enabled && self.indicator.messages.is_empty() {
            issues.push(ConfigIssue::warning(
                "indicator.messages",
                "empty message list; built-in phrases will be used",
            ));
        }

        if self.reaction.enabled {
            if self.reaction.provider.is_empty() {
                issues.push(ConfigIssue::error(
                    "reaction.provider",
                    "reactions enabled but no provider set",
                ));
            }
            if self.reaction.model.is_empty() {
                issues.push(ConfigIssue::error(
                    "reaction.model",
                    "reactions enabled but no model set",
                ));
            }
            if self.reaction.timeout_ms == 0 {
                issues.push(ConfigIssue::warning(
                    "reaction.timeout_ms",
                    "zero timeout; every generation call will be abandoned",
                ));
            }
            if self.reaction.max_tokens == 0 {
                issues.push(ConfigIssue::warning(
                    "reaction.max_tokens",
                    "zero token budget; generated text will be empty",
                ));
            }
        }

        issues
    }
}

/// Directory holding pensive's own files (`~/.pensive`).
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pensive")
}

/// Path of the standalone config file.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from the standalone file, falling back to defaults
/// when the file does not exist.
pub async fn load_config() -> ConfigResult<PensiveConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from an explicit path, falling back to defaults when
/// the file does not exist.
pub async fn load_config_from(path: &std::path::Path) -> ConfigResult<PensiveConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PensiveConfig::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    let config: PensiveConfig = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Save configuration to the standalone file, creating the directory if
/// needed.
pub async fn save_config(config: &PensiveConfig) -> ConfigResult<()> {
    save_config_to(config, &config_path()).await
}

/// Save configuration to an explicit path.
pub async fn save_config_to(
    config: &PensiveConfig,
    path: &std::path::Path,
) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config");
    Ok(())
}

/// Write a default config file unless one already exists (or `force`).
/// Returns the path written.
pub async fn init_config(force: bool) -> ConfigResult<PathBuf> {
    let path = config_path();
    if path.exists() && !force {
        return Err(ConfigError::invalid(format!(
            "config already exists at {}",
            path.display()
        )));
    }
    save_config_to(&PensiveConfig::default(), &path).await?;
    Ok(path)
}
