//! Conversation-keyed registry of live placeholder messages.
//!
//! Owned by whatever constructs indicators for a chat session and injected
//! into each [`crate::indicator::TypingIndicator`]. A new processing cycle
//! for a conversation takes over the key, which lets it find and delete a
//! placeholder left behind by a cycle that never reached cleanup.

use crate::transport::MessageRef;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Registry of the live placeholder message per conversation.
///
/// Cheap to clone; all clones share the same underlying map. Entries follow
/// last-writer-wins semantics.
#[derive(Clone, Default)]
pub struct PlaceholderRegistry {
    inner: Arc<RwLock<HashMap<String, MessageRef>>>,
}

impl std::fmt::Debug for PlaceholderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderRegistry").finish_non_exhaustive()
    }
}

impl PlaceholderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the live placeholder for a conversation, replacing any
    /// previous entry.
    pub async fn register(&self, key: &str, message: MessageRef) {
        let previous = self
            .inner
            .write()
            .await
            .insert(key.to_string(), message);
        if previous.is_some() {
            debug!(key = %key, "replaced stale placeholder registration");
        }
    }

    /// Remove and return the entry for a conversation, if any.
    pub async fn take(&self, key: &str) -> Option<MessageRef> {
        self.inner.write().await.remove(key)
    }

    /// Remove the entry for a conversation.
    pub async fn remove(&self, key: &str) {
        self.inner.write().await.remove(key);
    }

    /// Get a copy of the entry for a conversation, if any.
    pub async fn get(&self, key: &str) -> Option<MessageRef> {
        self.inner.read().await.get(key).cloned()
    }

    /// Number of registered conversations.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
