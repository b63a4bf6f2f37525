//! Personality text loading for generated reactions.
//!
//! When no explicit personality or system prompt is configured, a
//! `personality.md` file from the agent directory supplies the persona.
//! Only a bounded prefix of the file is ever read, and the result is cut to
//! a character budget on a paragraph or sentence boundary so the prompt
//! stays coherent. A missing file or directory is not an error.

use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

/// File name looked up inside the agent directory.
pub const PERSONALITY_FILE: &str = "personality.md";

/// Character budget applied to loaded personality text.
pub const PERSONALITY_CHAR_BUDGET: usize = 1200;

/// Upper bound on bytes read from the file.
const MAX_READ_BYTES: u64 = 16 * 1024;

/// Load personality text from `<agent_dir>/personality.md`.
///
/// Returns `None` when the file is absent, unreadable, or effectively
/// empty. Read errors are logged and swallowed.
pub async fn load_personality(agent_dir: &Path) -> Option<String> {
    let path = agent_dir.join(PERSONALITY_FILE);

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no personality file");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open personality file");
            return None;
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = file.take(MAX_READ_BYTES).read_to_end(&mut buf).await {
        warn!(path = %path.display(), error = %e, "failed to read personality file");
        return None;
    }

    let text = String::from_utf8_lossy(&buf);
    let text = truncate_on_boundary(&text, PERSONALITY_CHAR_BUDGET);
    if text.is_empty() {
        return None;
    }

    debug!(path = %path.display(), chars = text.chars().count(), "loaded personality");
    Some(text)
}

/// Cut `text` to at most `budget` characters, preferring a paragraph break,
/// then a sentence end, then a hard cut. The result is trimmed.
#[must_use]
pub fn truncate_on_boundary(text: &str, budget: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let prefix: String = text.chars().take(budget).collect();

    if let Some(pos) = prefix.rfind("\n\n") {
        return prefix[..pos].trim().to_string();
    }

    if let Some(pos) = prefix.rfind(". ") {
        return prefix[..=pos].trim().to_string();
    }

    prefix.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_on_boundary("  hello  ", 100), "hello");
    }

    #[test]
    fn test_truncate_prefers_paragraph_break() {
        let text = format!("first paragraph\n\n{}", "x".repeat(100));
        let out = truncate_on_boundary(&text, 40);
        assert_eq!(out, "first paragraph");
    }

    #[test]
    fn test_truncate_falls_back_to_sentence() {
        let text = format!("A short sentence. {}", "y".repeat(100));
        let out = truncate_on_boundary(&text, 40);
        assert_eq!(out, "A short sentence.");
    }

    #[test]
    fn test_truncate_hard_cut_without_boundaries() {
        let text = "z".repeat(100);
        let out = truncate_on_boundary(&text, 40);
        assert_eq!(out.chars().count(), 40);
    }

    #[tokio::test]
    async fn test_load_missing_dir_is_none() {
        let loaded = load_personality(Path::new("/definitely/not/here")).await;
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_reads_and_bounds_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("Keep it playful.\n\n{}", "filler ".repeat(400));
        tokio::fs::write(dir.path().join(PERSONALITY_FILE), &body)
            .await
            .unwrap();

        let loaded = load_personality(dir.path()).await.unwrap();
        assert!(loaded.starts_with("Keep it playful."));
        assert!(loaded.chars().count() <= PERSONALITY_CHAR_BUDGET);
    }

    #[tokio::test]
    async fn test_load_empty_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(PERSONALITY_FILE), "  \n ")
            .await
            .unwrap();
        assert!(load_personality(dir.path()).await.is_none());
    }
}
