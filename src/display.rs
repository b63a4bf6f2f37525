//! Status text for tool invocations.
//!
//! While the agent runs tools, the placeholder is rewritten to describe what
//! is happening ("📖 Reading notes.txt..."). Known tool shapes get a natural
//! description through a registered rule table; everything else falls back
//! to a `{emoji} {label}...` line built from configured styles or the tool
//! name itself.

use crate::util::{file_name_of, host_of, truncate_str};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Tool name reserved for verbatim status text chosen by the agent itself.
pub const REACTION_TOOL: &str = "reaction";

/// Emoji prefixed to verbatim reaction text.
pub const REACTION_EMOJI: &str = "💭";

/// Emoji used when no style is configured for a tool.
const FALLBACK_EMOJI: &str = "●";

/// Character budget for argument excerpts embedded in status text.
const ARG_EXCERPT_CHARS: usize = 40;

/// Display style for a tool in fallback formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStyle {
    /// Emoji shown before the label.
    pub emoji: String,
    /// Human-readable label.
    pub label: String,
}

impl ToolStyle {
    /// Create a new tool style.
    pub fn new(emoji: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            label: label.into(),
        }
    }
}

/// Formatter callback for a display rule.
///
/// Receives the tool name and its arguments; returns `None` to decline the
/// invocation (for example when an expected argument is missing), which
/// passes dispatch on to the next rule or the fallback.
pub type RuleFormatter = Arc<dyn Fn(&str, Option<&Value>) -> Option<String> + Send + Sync>;

/// A single `{pattern, formatter}` dispatch entry.
#[derive(Clone)]
pub struct DisplayRule {
    pattern: Regex,
    format: RuleFormatter,
}

impl std::fmt::Debug for DisplayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayRule")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Registered dispatch table mapping tool invocations to status text.
///
/// Rules are consulted in registration order; the first matching rule whose
/// formatter returns text wins. New tools can be supported by registering a
/// rule, without touching the indicator itself.
#[derive(Clone)]
pub struct ToolDisplayTable {
    rules: Vec<DisplayRule>,
    styles: HashMap<String, ToolStyle>,
}

impl std::fmt::Debug for ToolDisplayTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDisplayTable")
            .field("rules", &self.rules.len())
            .field("styles", &self.styles.len())
            .finish_non_exhaustive()
    }
}

impl Default for ToolDisplayTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ToolDisplayTable {
    /// Create an empty table with no rules and no styles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            styles: HashMap::new(),
        }
    }

    /// Create a table seeded with the built-in rules for common tool shapes:
    /// file reads/writes/edits, shell commands, searches, and URL fetches.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .rule(r"(?i)^(read|read_file|open_file|cat_file|view_file)$", |_, args| {
                named_file(args).map(|name| format!("📖 Reading {name}..."))
            })
            .rule(r"(?i)^(write|write_file|create_file|save_file)$", |_, args| {
                named_file(args).map(|name| format!("✏️ Writing {name}..."))
            })
            .rule(r"(?i)^(edit|edit_file|apply_patch|patch_file)$", |_, args| {
                named_file(args).map(|name| format!("✏️ Editing {name}..."))
            })
            .rule(r"(?i)^(exec|shell|bash|run_command|execute)$", |_, args| {
                first_str(args, &["command", "cmd", "script"])
                    .map(|cmd| format!("💻 Running {}...", truncate_str(cmd, ARG_EXCERPT_CHARS)))
            })
            .rule(r"(?i)^(search|web_search|grep|find)$", |_, args| {
                first_str(args, &["query", "pattern", "q"])
                    .map(|q| format!("🔍 Searching {}...", truncate_str(q, ARG_EXCERPT_CHARS)))
            })
            .rule(r"(?i)^(fetch|web_fetch|http_get|browse|open_url)$", |_, args| {
                first_str(args, &["url", "uri", "link"])
                    .and_then(host_of)
                    .map(|host| format!("🌐 Fetching {host}..."))
            })
    }

    /// Register a dispatch rule. The pattern is matched against the tool
    /// name; an invalid pattern is logged and skipped.
    #[must_use]
    pub fn rule<F>(mut self, pattern: &str, format: F) -> Self
    where
        F: Fn(&str, Option<&Value>) -> Option<String> + Send + Sync + 'static,
    {
        match Regex::new(pattern) {
            Ok(pattern) => self.rules.push(DisplayRule {
                pattern,
                format: Arc::new(format),
            }),
            Err(e) => warn!(pattern = %pattern, error = %e, "invalid display rule pattern"),
        }
        self
    }

    /// Set the style overrides used by fallback formatting.
    #[must_use]
    pub fn styles(mut self, styles: HashMap<String, ToolStyle>) -> Self {
        self.styles = styles;
        self
    }

    /// Add a single style override.
    #[must_use]
    pub fn style(mut self, tool: impl Into<String>, style: ToolStyle) -> Self {
        self.styles.insert(tool.into(), style);
        self
    }

    /// Compute the status text for a tool invocation.
    ///
    /// Dispatch order: first matching rule that produces text, then the
    /// configured style for the tool, then the tool name itself.
    #[must_use]
    pub fn describe(&self, tool_name: &str, args: Option<&Value>) -> String {
        for rule in &self.rules {
            if rule.pattern.is_match(tool_name) {
                if let Some(text) = (rule.format)(tool_name, args) {
                    return text;
                }
            }
        }

        if let Some(style) = self.styles.get(tool_name) {
            return format!("{} {}...", style.emoji, style.label);
        }

        format!("{FALLBACK_EMOJI} {tool_name}...")
    }
}

/// Build the verbatim status text for the special `"reaction"` tool.
///
/// Returns `None` when the `message` argument is missing or not a string,
/// in which case the invocation is ignored.
#[must_use]
pub fn reaction_text(args: Option<&Value>) -> Option<String> {
    let message = args?.get("message")?.as_str()?;
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    Some(format!("{REACTION_EMOJI} {message}"))
}

/// First string value among the given argument keys.
fn first_str<'a>(args: Option<&'a Value>, keys: &[&str]) -> Option<&'a str> {
    let args = args?;
    keys.iter().find_map(|key| args.get(key)?.as_str())
}

/// File-name excerpt from path-shaped arguments.
fn named_file(args: Option<&Value>) -> Option<String> {
    first_str(args, &["path", "file_path", "filename", "file"])
        .map(|path| truncate_str(file_name_of(path), ARG_EXCERPT_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_rule_extracts_file_name() {
        let table = ToolDisplayTable::with_defaults();
        let text = table.describe("read_file", Some(&json!({"path": "/tmp/work/notes.txt"})));
        assert_eq!(text, "📖 Reading notes.txt...");
    }

    #[test]
    fn test_exec_rule_truncates_command() {
        let table = ToolDisplayTable::with_defaults();
        let long = "x".repeat(120);
        let text = table.describe("bash", Some(&json!({"command": long})));
        assert!(text.starts_with("💻 Running "));
        assert!(text.ends_with("…..."));
    }

    #[test]
    fn test_search_rule() {
        let table = ToolDisplayTable::with_defaults();
        let text = table.describe("web_search", Some(&json!({"query": "rust async traits"})));
        assert_eq!(text, "🔍 Searching rust async traits...");
    }

    #[test]
    fn test_fetch_rule_uses_host() {
        let table = ToolDisplayTable::with_defaults();
        let text = table.describe("fetch", Some(&json!({"url": "https://docs.rs/tokio/latest"})));
        assert_eq!(text, "🌐 Fetching docs.rs...");
    }

    #[test]
    fn test_rule_declines_on_missing_arg() {
        // The read rule matches but has no path to show, so dispatch falls
        // through to the tool-name fallback.
        let table = ToolDisplayTable::with_defaults();
        let text = table.describe("read_file", Some(&json!({})));
        assert_eq!(text, "● read_file...");
    }

    #[test]
    fn test_style_fallback() {
        let table = ToolDisplayTable::with_defaults().style("foo", ToolStyle::new("🛠", "Working"));
        assert_eq!(table.describe("foo", Some(&json!({}))), "🛠 Working...");
    }

    #[test]
    fn test_name_fallback() {
        let table = ToolDisplayTable::with_defaults();
        assert_eq!(table.describe("mystery_tool", None), "● mystery_tool...");
    }

    #[test]
    fn test_custom_rule_takes_precedence_over_style() {
        let table = ToolDisplayTable::new()
            .rule("^deploy$", |_, _| Some("🚀 Deploying...".to_string()))
            .style("deploy", ToolStyle::new("🛠", "Working"));
        assert_eq!(table.describe("deploy", None), "🚀 Deploying...");
    }

    #[test]
    fn test_reaction_text() {
        assert_eq!(
            reaction_text(Some(&json!({"message": "查一下"}))),
            Some("💭 查一下".to_string())
        );
        assert_eq!(reaction_text(Some(&json!({"message": 7}))), None);
        assert_eq!(reaction_text(Some(&json!({}))), None);
        assert_eq!(reaction_text(None), None);
        assert_eq!(reaction_text(Some(&json!({"message": "  "}))), None);
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let table = ToolDisplayTable::new().rule("(unclosed", |_, _| None);
        assert_eq!(table.describe("anything", None), "● anything...");
    }
}
