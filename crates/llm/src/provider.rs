use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use snafu::Snafu;

use super::model::{DEFAULT_GEMINI_MODEL, GenerationSettings};

/// Speaker labels understood by completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub api_key: String,
    pub endpoint: String,
    pub model_id: String,
    pub generation: GenerationSettings,
}

impl ProviderConfig {
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
            model_id: DEFAULT_GEMINI_MODEL.to_string(),
            generation: GenerationSettings::default(),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into().trim().to_string();
        if !model_id.is_empty() {
            self.model_id = model_id;
        }
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One chat completion: the prior turns plus the prompt being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub history: Vec<ProviderMessage>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, history: Vec<ProviderMessage>) -> Self {
        Self {
            prompt: prompt.into(),
            history,
        }
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("missing API key for provider '{provider_id}'"))]
    MissingApiKey {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("provider '{provider_id}' is not supported"))]
    UnsupportedProvider {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("completions failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("provider did not answer within {timeout:?}"))]
    TimedOut {
        stage: &'static str,
        timeout: Duration,
    },
    #[snafu(display("completion worker stopped on `{stage}`: {details}"))]
    Interrupted {
        stage: &'static str,
        details: String,
    },
}

impl ProviderError {
    /// True when the failure is a local configuration problem rather than a remote one.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey { .. } | Self::UnsupportedProvider { .. }
        )
    }
}

pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn default_model(&self) -> &str;
    fn complete<'a>(&'a self, request: CompletionRequest) -> BoxFuture<'a, ProviderResult<String>>;
    fn greet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

/// Runs one completion, failing with `TimedOut` once `timeout` elapses.
pub async fn complete_with_timeout(
    provider: &dyn CompletionProvider,
    request: CompletionRequest,
    timeout: Option<Duration>,
) -> ProviderResult<String> {
    let Some(timeout) = timeout else {
        return provider.complete(request).await;
    };

    match tokio::time::timeout(timeout, provider.complete(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                provider_id = %provider.id(),
                timeout_ms = timeout.as_millis() as u64,
                "completion request timed out"
            );
            TimedOutSnafu {
                stage: "complete-with-timeout",
                timeout,
            }
            .fail()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StalledProvider;

    impl CompletionProvider for StalledProvider {
        fn id(&self) -> &str {
            "stalled"
        }

        fn name(&self) -> &str {
            "Stalled"
        }

        fn default_model(&self) -> &str {
            DEFAULT_GEMINI_MODEL
        }

        fn complete<'a>(
            &'a self,
            _request: CompletionRequest,
        ) -> BoxFuture<'a, ProviderResult<String>> {
            Box::pin(futures::future::pending())
        }

        fn greet<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
            Box::pin(async { Ok(String::from("hello")) })
        }
    }

    #[test]
    fn config_trims_and_keeps_default_model_for_blank_override() {
        let config = ProviderConfig::new(" gemini ", " key ", " ").with_model("   ");
        assert_eq!(config.provider_id, "gemini");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint, "");
        assert_eq!(config.model_id, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn configuration_errors_are_classified() {
        let missing = ProviderError::MissingApiKey {
            stage: "test",
            provider_id: "gemini".to_string(),
        };
        let timed_out = ProviderError::TimedOut {
            stage: "test",
            timeout: Duration::from_secs(1),
        };
        assert!(missing.is_configuration());
        assert!(!timed_out.is_configuration());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out() {
        let request = CompletionRequest::new("hi", Vec::new());
        let result =
            complete_with_timeout(&StalledProvider, request, Some(Duration::from_secs(30))).await;
        assert!(matches!(result, Err(ProviderError::TimedOut { .. })));
    }
}
