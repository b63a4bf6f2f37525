//! Placeholder lifecycle for a single conversation.
//!
//! A [`TypingIndicator`] owns at most one live "thinking" message. The
//! orchestrator calls [`TypingIndicator::start`] when it begins handling a
//! user message, [`TypingIndicator::on_tool`] per tool invocation, and
//! [`TypingIndicator::cleanup`] once the real response is ready. Every
//! transport failure is logged and swallowed; none of these operations can
//! fail from the caller's point of view.

use crate::config::{DEFAULT_MESSAGES, IndicatorConfig};
use crate::display::{REACTION_TOOL, ToolDisplayTable, reaction_text};
use crate::reaction::{HistoryEntry, ReactionSource};
use crate::registry::PlaceholderRegistry;
use crate::transport::{MessageRef, SharedTransport};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Per-cycle session state.
#[derive(Debug, Default)]
struct SessionState {
    active: bool,
    message: Option<MessageRef>,
    displayed: String,
}

/// Placeholder controller for one conversation.
///
/// Construct one per conversation being processed; independent
/// conversations run independent indicators against the same registry.
pub struct TypingIndicator {
    config: IndicatorConfig,
    display: ToolDisplayTable,
    transport: SharedTransport,
    registry: PlaceholderRegistry,
    chat_id: String,
    reactions: Option<Arc<dyn ReactionSource>>,
    state: Arc<Mutex<SessionState>>,
}

impl std::fmt::Debug for TypingIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingIndicator")
            .field("chat_id", &self.chat_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TypingIndicator {
    /// Create an indicator for the given conversation.
    ///
    /// The display table starts from the built-in rules with the config's
    /// style overrides applied.
    #[must_use]
    pub fn new(
        config: IndicatorConfig,
        transport: SharedTransport,
        registry: PlaceholderRegistry,
        chat_id: impl Into<String>,
    ) -> Self {
        let display = ToolDisplayTable::with_defaults().styles(config.tool_display.clone());
        Self {
            config,
            display,
            transport,
            registry,
            chat_id: chat_id.into(),
            reactions: None,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Attach a source of generated reaction text.
    #[must_use]
    pub fn with_reactions(mut self, source: Arc<dyn ReactionSource>) -> Self {
        self.reactions = Some(source);
        self
    }

    /// Replace the tool display table wholesale. Style overrides from the
    /// config are not re-applied to the given table.
    #[must_use]
    pub fn with_display(mut self, display: ToolDisplayTable) -> Self {
        self.display = display;
        self
    }

    /// Whether a placeholder is currently live.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    /// Begin a cycle: delete any stale placeholder registered for this
    /// conversation, then send a fresh one.
    ///
    /// No-op when disabled or already active. When a reaction source and a
    /// user message are present, a refined reaction is requested in the
    /// background and applied only if this cycle is still current.
    pub async fn start(&self, user_message: Option<&str>, history: &[HistoryEntry]) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        if state.active {
            debug!(chat_id = %self.chat_id, "placeholder already active");
            return;
        }

        if let Some(stale) = self.registry.take(&self.chat_id).await {
            debug!(chat_id = %self.chat_id, message_id = %stale.message_id, "deleting stale placeholder");
            if let Err(e) = self.transport.delete(&stale).await {
                debug!(chat_id = %self.chat_id, error = %e, "failed to delete stale placeholder");
            }
        }

        let text = pick_message(&self.config.messages);
        match self.transport.send(&self.chat_id, &text).await {
            Ok(message) => {
                state.active = true;
                state.displayed = text;
                state.message = Some(message.clone());
                self.registry.register(&self.chat_id, message.clone()).await;

                if let (Some(source), Some(user_message)) = (&self.reactions, user_message) {
                    self.spawn_reaction(
                        Arc::clone(source),
                        message,
                        user_message.to_string(),
                        history.to_vec(),
                    );
                }
            }
            Err(e) => {
                warn!(chat_id = %self.chat_id, error = %e, "failed to send placeholder");
            }
        }
    }

    /// Rewrite the placeholder to describe a tool invocation.
    ///
    /// No-op when disabled or inactive. The `"reaction"` pseudo-tool shows
    /// its `message` argument verbatim and skips generation for that call.
    pub async fn on_tool(&self, tool_name: &str, args: Option<&Value>) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        if !state.active {
            return;
        }
        let Some(message) = state.message.clone() else {
            return;
        };

        if tool_name == REACTION_TOOL {
            if let Some(text) = reaction_text(args) {
                self.edit_if_changed(&mut state, &message, text).await;
            }
            return;
        }

        let text = self.display.describe(tool_name, args);
        self.edit_if_changed(&mut state, &message, text).await;
        drop(state);

        if let Some(source) = &self.reactions {
            self.spawn_tool_description(
                Arc::clone(source),
                message,
                tool_name.to_string(),
                args.cloned(),
            );
        }
    }

    /// End the cycle: optionally delete the placeholder, deregister it, and
    /// reset to inactive.
    pub async fn cleanup(&self) {
        let mut state = self.state.lock().await;
        if !state.active {
            return;
        }

        if self.config.delete_on_response {
            if let Some(message) = &state.message {
                if let Err(e) = self.transport.delete(message).await {
                    debug!(chat_id = %self.chat_id, error = %e, "failed to delete placeholder");
                }
            }
        }

        self.registry.remove(&self.chat_id).await;
        state.active = false;
        state.message = None;
        state.displayed.clear();
    }

    /// Edit the placeholder unless the text is already displayed.
    async fn edit_if_changed(
        &self,
        state: &mut SessionState,
        message: &MessageRef,
        text: String,
    ) {
        if state.displayed == text {
            return;
        }
        match self.transport.edit(message, &text).await {
            Ok(()) => state.displayed = text,
            Err(e) => {
                warn!(chat_id = %self.chat_id, error = %e, "failed to edit placeholder");
            }
        }
    }

    fn spawn_reaction(
        &self,
        source: Arc<dyn ReactionSource>,
        message: MessageRef,
        user_message: String,
        history: Vec<HistoryEntry>,
    ) {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(text) = source.reaction(&user_message, &history).await {
                apply_refinement(&transport, &state, &message, text).await;
            }
        });
    }

    fn spawn_tool_description(
        &self,
        source: Arc<dyn ReactionSource>,
        message: MessageRef,
        tool_name: String,
        args: Option<Value>,
    ) {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(text) = source.tool_description(&tool_name, args.as_ref()).await {
                apply_refinement(&transport, &state, &message, text).await;
            }
        });
    }
}

/// Apply refined text to the placeholder a detached task was started for.
///
/// The captured message reference is compared against the current session
/// under the lock: a refinement that arrives after cleanup or after a newer
/// cycle took over is discarded.
async fn apply_refinement(
    transport: &SharedTransport,
    state: &Mutex<SessionState>,
    sent: &MessageRef,
    text: String,
) {
    let mut state = state.lock().await;
    if !state.active || state.message.as_ref() != Some(sent) || state.displayed == text {
        return;
    }
    match transport.edit(sent, &text).await {
        Ok(()) => state.displayed = text,
        Err(e) => debug!(error = %e, "failed to apply refined placeholder text"),
    }
}

/// Uniformly random pick among the configured phrases.
fn pick_message(messages: &[String]) -> String {
    if messages.is_empty() {
        return DEFAULT_MESSAGES[0].to_string();
    }
    messages[fastrand::usize(..messages.len())].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReactionConfig;
    use crate::error::{TransportError, TransportResult};
    use crate::reaction::provider::{
        CompletionProvider, CompletionRequest, ContentBlock, ProviderResult,
    };
    use crate::reaction::ReactionGenerator;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Transport fake that records every call.
    #[derive(Default)]
    struct RecordingTransport {
        sends: StdMutex<Vec<(String, String)>>,
        edits: StdMutex<Vec<(String, String)>>,
        deletes: StdMutex<Vec<String>>,
        fail_send: AtomicBool,
        next_id: AtomicU64,
    }

    impl RecordingTransport {
        fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn sends(&self) -> Vec<(String, String)> {
            self.sends.lock().unwrap().clone()
        }

        fn edits(&self) -> Vec<(String, String)> {
            self.edits.lock().unwrap().clone()
        }

        fn deletes(&self) -> Vec<String> {
            self.deletes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, chat_id: &str, text: &str) -> TransportResult<MessageRef> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(TransportError::send("unreachable"));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
            self.sends
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(MessageRef::new(id, chat_id))
        }

        async fn edit(&self, message: &MessageRef, text: &str) -> TransportResult<()> {
            self.edits
                .lock()
                .unwrap()
                .push((message.message_id.clone(), text.to_string()));
            Ok(())
        }

        async fn delete(&self, message: &MessageRef) -> TransportResult<()> {
            self.deletes.lock().unwrap().push(message.message_id.clone());
            Ok(())
        }
    }

    /// Reaction source fake with a fixed answer and optional delay.
    struct FixedSource {
        reaction: Option<String>,
        tool: Option<String>,
        delay: Duration,
        tool_calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(reaction: Option<&str>, tool: Option<&str>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reaction: reaction.map(String::from),
                tool: tool.map(String::from),
                delay,
                tool_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReactionSource for FixedSource {
        async fn reaction(&self, _msg: &str, _history: &[HistoryEntry]) -> Option<String> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reaction.clone()
        }

        async fn tool_description(&self, _tool: &str, _args: Option<&Value>) -> Option<String> {
            self.tool_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.tool.clone()
        }
    }

    fn config() -> IndicatorConfig {
        IndicatorConfig::enabled().messages(["🤔 Thinking..."])
    }

    fn indicator(transport: &Arc<RecordingTransport>) -> TypingIndicator {
        TypingIndicator::new(
            config(),
            transport.clone(),
            PlaceholderRegistry::new(),
            "chat1",
        )
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let transport = RecordingTransport::shared();
        let indicator = TypingIndicator::new(
            IndicatorConfig::default(),
            transport.clone(),
            PlaceholderRegistry::new(),
            "chat1",
        );

        indicator.start(None, &[]).await;
        assert!(!indicator.is_active().await);
        assert!(transport.sends().is_empty());
    }

    #[tokio::test]
    async fn test_start_sends_and_activates() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);

        indicator.start(None, &[]).await;
        assert!(indicator.is_active().await);

        let sends = transport.sends();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0], ("chat1".to_string(), "🤔 Thinking...".to_string()));
    }

    #[tokio::test]
    async fn test_start_while_active_sends_nothing() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);

        indicator.start(None, &[]).await;
        indicator.start(None, &[]).await;
        assert_eq!(transport.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_stays_inactive() {
        let transport = RecordingTransport::shared();
        transport.fail_send.store(true, Ordering::SeqCst);
        let indicator = indicator(&transport);

        indicator.start(None, &[]).await;
        assert!(!indicator.is_active().await);
    }

    #[tokio::test]
    async fn test_on_tool_edits_with_status_text() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);

        indicator.start(None, &[]).await;
        indicator
            .on_tool("read_file", Some(&serde_json::json!({"path": "a/b/notes.txt"})))
            .await;

        let edits = transport.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1, "📖 Reading notes.txt...");
    }

    #[tokio::test]
    async fn test_identical_text_edits_once() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);
        let args = serde_json::json!({"path": "notes.txt"});

        indicator.start(None, &[]).await;
        indicator.on_tool("read_file", Some(&args)).await;
        indicator.on_tool("read_file", Some(&args)).await;

        assert_eq!(transport.edits().len(), 1);
    }

    #[tokio::test]
    async fn test_on_tool_before_start_is_noop() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);

        indicator.on_tool("read_file", None).await;
        assert!(transport.edits().is_empty());
    }

    #[tokio::test]
    async fn test_style_fallback_from_config() {
        let transport = RecordingTransport::shared();
        let indicator = TypingIndicator::new(
            config().tool_style("foo", "🛠", "Working"),
            transport.clone(),
            PlaceholderRegistry::new(),
            "chat1",
        );

        indicator.start(None, &[]).await;
        indicator.on_tool("foo", Some(&serde_json::json!({}))).await;

        assert_eq!(transport.edits()[0].1, "🛠 Working...");
    }

    #[tokio::test]
    async fn test_reaction_tool_is_verbatim_and_skips_generation() {
        let transport = RecordingTransport::shared();
        let source = FixedSource::new(None, Some("never shown"), Duration::ZERO);
        let indicator = indicator(&transport).with_reactions(source.clone());

        indicator.start(None, &[]).await;
        indicator
            .on_tool("reaction", Some(&serde_json::json!({"message": "查一下"})))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(transport.edits()[0].1, "💭 查一下");
        assert_eq!(source.tool_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_and_deactivates() {
        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport);

        indicator.start(None, &[]).await;
        indicator.cleanup().await;

        assert!(!indicator.is_active().await);
        assert_eq!(transport.deletes().len(), 1);

        // A second cleanup is a no-op.
        indicator.cleanup().await;
        assert_eq!(transport.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_message_when_configured() {
        let transport = RecordingTransport::shared();
        let registry = PlaceholderRegistry::new();
        let indicator = TypingIndicator::new(
            config().delete_on_response(false),
            transport.clone(),
            registry.clone(),
            "chat1",
        );

        indicator.start(None, &[]).await;
        indicator.cleanup().await;

        assert!(transport.deletes().is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_refinement_applies_while_active() {
        let transport = RecordingTransport::shared();
        let source = FixedSource::new(Some("on it, boss"), None, Duration::from_millis(10));
        let indicator = indicator(&transport).with_reactions(source);

        indicator.start(Some("hey"), &[]).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let edits = transport.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1, "on it, boss");
    }

    #[tokio::test]
    async fn test_late_refinement_after_cleanup_is_discarded() {
        let transport = RecordingTransport::shared();
        let source = FixedSource::new(Some("too late"), None, Duration::from_millis(50));
        let indicator = indicator(&transport).with_reactions(source);

        indicator.start(Some("hey"), &[]).await;
        indicator.cleanup().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(transport.edits().is_empty());
        assert!(!indicator.is_active().await);
    }

    #[tokio::test]
    async fn test_generator_timeout_leaves_canned_text() {
        /// Provider that answers well past the generator deadline.
        struct SlowProvider;

        #[async_trait]
        impl CompletionProvider for SlowProvider {
            fn name(&self) -> &str {
                "slow"
            }
            fn is_available(&self) -> bool {
                true
            }
            async fn complete(
                &self,
                _request: &CompletionRequest,
            ) -> ProviderResult<Vec<ContentBlock>> {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(vec![ContentBlock::Text {
                    text: "too slow".to_string(),
                }])
            }
        }

        let generator = ReactionGenerator::new(
            ReactionConfig::enabled("openai", "test-model").timeout_ms(10),
            Arc::new(SlowProvider),
        );

        let transport = RecordingTransport::shared();
        let indicator = indicator(&transport).with_reactions(Arc::new(generator));

        indicator.start(Some("hey"), &[]).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(transport.edits().is_empty());
        assert_eq!(transport.sends()[0].1, "🤔 Thinking...");
        assert!(indicator.is_active().await);
    }

    #[tokio::test]
    async fn test_stale_placeholder_deleted_on_restart() {
        let transport = RecordingTransport::shared();
        let registry = PlaceholderRegistry::new();

        // First cycle never reaches cleanup.
        let first = TypingIndicator::new(
            config(),
            transport.clone(),
            registry.clone(),
            "chat1",
        );
        first.start(None, &[]).await;
        drop(first);
        assert_eq!(registry.len().await, 1);

        let second = TypingIndicator::new(
            config(),
            transport.clone(),
            registry.clone(),
            "chat1",
        );
        second.start(None, &[]).await;

        // The stale message from the first cycle is gone, the new one is
        // registered in its place.
        assert_eq!(transport.deletes(), vec!["0".to_string()]);
        assert_eq!(transport.sends().len(), 2);
        assert_eq!(
            registry.get("chat1").await.map(|m| m.message_id),
            Some("1".to_string())
        );
    }

    #[tokio::test]
    async fn test_tool_description_refinement_applies() {
        let transport = RecordingTransport::shared();
        let source = FixedSource::new(None, Some("peeking at notes.txt"), Duration::from_millis(10));
        let indicator = indicator(&transport).with_reactions(source);

        indicator.start(None, &[]).await;
        indicator
            .on_tool("read_file", Some(&serde_json::json!({"path": "notes.txt"})))
            .await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        let edits = transport.edits();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].1, "📖 Reading notes.txt...");
        assert_eq!(edits[1].1, "peeking at notes.txt");
    }

    #[test]
    fn test_pick_message_empty_falls_back() {
        assert_eq!(pick_message(&[]), DEFAULT_MESSAGES[0]);
    }

    #[test]
    fn test_pick_message_uses_configured() {
        let messages = vec!["a".to_string(), "b".to_string()];
        let picked = pick_message(&messages);
        assert!(messages.contains(&picked));
    }
}
