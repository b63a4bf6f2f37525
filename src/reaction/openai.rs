//! OpenAI-compatible chat-completions provider.
//!
//! Covers every service exposing the `/chat/completions` shape: OpenAI,
//! Groq, OpenRouter, and local Ollama. The API key is resolved through an
//! injectable resolver keyed by provider name, defaulting to the
//! `{PROVIDER}_API_KEY` environment variable.

use super::provider::{
    ChatMessage, CompletionProvider, CompletionRequest, ContentBlock, ProviderError,
    ProviderResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolver from provider name to API key.
pub type ApiKeyResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolve an API key from the `{PROVIDER}_API_KEY` environment variable.
#[must_use]
pub fn env_key_resolver(provider: &str) -> Option<String> {
    let var = format!(
        "{}_API_KEY",
        provider.to_uppercase().replace(['-', '.'], "_")
    );
    std::env::var(var).ok()
}

/// Known chat-completions endpoints by provider name.
fn endpoint_for(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("https://api.openai.com/v1/chat/completions"),
        "groq" => Some("https://api.groq.com/openai/v1/chat/completions"),
        "openrouter" => Some("https://openrouter.ai/api/v1/chat/completions"),
        "ollama" => Some("http://localhost:11434/v1/chat/completions"),
        _ => None,
    }
}

/// Whether a provider requires an API key.
fn needs_key(provider: &str) -> bool {
    provider != "ollama"
}

/// Completion provider speaking the OpenAI chat-completions dialect.
#[derive(Clone)]
pub struct OpenAiCompatible {
    provider: String,
    base_url: Option<String>,
    api_key: Option<String>,
    resolver: ApiKeyResolver,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatible")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatible {
    /// Create a provider client for the given provider name.
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            base_url: None,
            api_key: None,
            resolver: Arc::new(env_key_resolver),
            client: reqwest::Client::new(),
        }
    }

    /// Set an explicit API key, bypassing the resolver.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set a custom endpoint URL, overriding the provider table.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the API key resolver.
    #[must_use]
    pub fn with_key_resolver(mut self, resolver: ApiKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set a transport-level request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => warn!(error = %e, "failed to rebuild HTTP client; keeping previous"),
        }
        self
    }

    fn url(&self) -> ProviderResult<String> {
        if let Some(url) = &self.base_url {
            return Ok(url.clone());
        }
        endpoint_for(&self.provider)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::UnknownProvider(self.provider.clone()))
    }

    fn key(&self) -> ProviderResult<Option<String>> {
        if let Some(key) = &self.api_key {
            return Ok(Some(key.clone()));
        }
        match (self.resolver)(&self.provider) {
            Some(key) => Ok(Some(key)),
            None if needs_key(&self.provider) => {
                Err(ProviderError::MissingApiKey(self.provider.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatible {
    fn name(&self) -> &str {
        &self.provider
    }

    fn is_available(&self) -> bool {
        let has_endpoint = self.base_url.is_some() || endpoint_for(&self.provider).is_some();
        let has_key = self.api_key.is_some()
            || (self.resolver)(&self.provider).is_some()
            || !needs_key(&self.provider);
        has_endpoint && has_key
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Vec<ContentBlock>> {
        let url = self.url()?;
        let key = self.key()?;

        let mut messages: Vec<ChatMessage> = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().cloned());

        let body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        });

        debug!(provider = %self.provider, model = %request.model, "completion request");

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ProviderError::Api(format!("HTTP {status}: {body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(vec![ContentBlock::Text { text }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_endpoints() {
        assert!(endpoint_for("openai").unwrap().contains("api.openai.com"));
        assert!(endpoint_for("groq").unwrap().contains("api.groq.com"));
        assert!(endpoint_for("made-up").is_none());
    }

    #[test]
    fn test_unknown_provider_without_base_url() {
        let provider = OpenAiCompatible::new("made-up").with_api_key("k");
        assert!(matches!(
            provider.url(),
            Err(ProviderError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_base_url_override() {
        let provider = OpenAiCompatible::new("made-up")
            .with_base_url("http://localhost:8080/v1/chat/completions");
        assert_eq!(
            provider.url().unwrap(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_key_for_cloud_provider() {
        let provider =
            OpenAiCompatible::new("openai").with_key_resolver(Arc::new(|_| None));
        assert!(matches!(
            provider.key(),
            Err(ProviderError::MissingApiKey(_))
        ));
        assert!(!provider.is_available());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let provider =
            OpenAiCompatible::new("ollama").with_key_resolver(Arc::new(|_| None));
        assert!(provider.key().unwrap().is_none());
        assert!(provider.is_available());
    }

    #[test]
    fn test_resolver_is_keyed_by_provider() {
        let provider = OpenAiCompatible::new("groq").with_key_resolver(Arc::new(|name| {
            (name == "groq").then(|| "secret".to_string())
        }));
        assert_eq!(provider.key().unwrap(), Some("secret".to_string()));
    }
}
