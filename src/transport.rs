//! Transport trait for delivering placeholder messages.
//!
//! The transport is the seam between the placeholder lifecycle and an actual
//! chat platform. Implementations wrap a platform API (see
//! [`crate::transports::telegram`]) or record calls in tests. All three
//! operations must be safe to call against a message that was already
//! removed by other means; the caller treats every failure as non-fatal.

use crate::error::TransportResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Reference to a message that was delivered through a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    /// Platform message identifier.
    pub message_id: String,
    /// Chat/conversation identifier the message lives in.
    pub chat_id: String,
}

impl MessageRef {
    /// Create a new message reference.
    pub fn new(message_id: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            chat_id: chat_id.into(),
        }
    }
}

/// Trait for sending, editing, and deleting chat messages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `text` to the given chat and return a reference to the new
    /// message.
    async fn send(&self, chat_id: &str, text: &str) -> TransportResult<MessageRef>;

    /// Replace the text of a previously sent message.
    async fn edit(&self, message: &MessageRef, text: &str) -> TransportResult<()>;

    /// Delete a previously sent message.
    async fn delete(&self, message: &MessageRef) -> TransportResult<()>;
}

/// Type alias for a shared transport handle.
pub type SharedTransport = Arc<dyn Transport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ref_equality() {
        let a = MessageRef::new("42", "chat1");
        let b = MessageRef::new("42", "chat1");
        let c = MessageRef::new("43", "chat1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
