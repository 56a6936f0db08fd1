use rig::completion::{AssistantContent, CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::gemini;
use snafu::{ResultExt, ensure};

use super::model::GenerationSettings;
use super::provider::{
    BoxFuture, CompletionProvider, CompletionRequest, CompletionsFailedSnafu, HttpClientSnafu,
    MissingApiKeySnafu, ProviderConfig, ProviderMessage, ProviderResult, Role,
};

pub const RIG_GEMINI_PROVIDER_ID: &str = "gemini";

pub fn greeting_prompt(name: &str) -> String {
    format!(
        "Write a short, inspiring, one-sentence morning greeting for {name}. Make it professional yet warm."
    )
}

pub struct RigGeminiAdapter {
    config: ProviderConfig,
}

impl RigGeminiAdapter {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-adapter-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self { config })
    }

    fn build_client(config: &ProviderConfig) -> ProviderResult<gemini::Client> {
        let mut builder = gemini::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    fn to_rig_message(message: &ProviderMessage) -> RigMessage {
        // Gemini names the assistant side "model"; rig applies that label on the wire.
        match message.role {
            Role::User => RigMessage::user(message.content.clone()),
            Role::Assistant => RigMessage::assistant(message.content.clone()),
        }
    }

    fn generation_params(generation: &GenerationSettings) -> serde_json::Value {
        serde_json::json!({
            "generationConfig": {
                "topP": generation.top_p,
                "topK": generation.top_k,
            }
        })
    }

    fn collect_text<'a>(choice: impl Iterator<Item = &'a AssistantContent>) -> String {
        choice
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    async fn send_completion(
        config: &ProviderConfig,
        request: CompletionRequest,
    ) -> ProviderResult<String> {
        let client = Self::build_client(config)?;
        let model = client.completion_model(config.model_id.clone());

        let history = request
            .history
            .iter()
            .map(Self::to_rig_message)
            .collect::<Vec<_>>();

        tracing::debug!(
            provider_id = %config.provider_id,
            model_id = %config.model_id,
            history_len = history.len(),
            "sending completion request"
        );

        let response = model
            .completion_request(RigMessage::user(request.prompt))
            .messages(history)
            .temperature(config.generation.temperature)
            .additional_params(Self::generation_params(&config.generation))
            .send()
            .await
            .context(CompletionsFailedSnafu {
                stage: "send-completion",
            })?;

        Ok(Self::collect_text(response.choice.iter()))
    }

    async fn send_greeting(config: &ProviderConfig, name: &str) -> ProviderResult<String> {
        let client = Self::build_client(config)?;
        let model = client.completion_model(config.model_id.clone());

        let response = model
            .completion_request(RigMessage::user(greeting_prompt(name)))
            .send()
            .await
            .context(CompletionsFailedSnafu {
                stage: "send-greeting",
            })?;

        Ok(Self::collect_text(response.choice.iter()))
    }
}

impl CompletionProvider for RigGeminiAdapter {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        "Rig Gemini"
    }

    fn default_model(&self) -> &str {
        &self.config.model_id
    }

    fn complete<'a>(&'a self, request: CompletionRequest) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let result = Self::send_completion(&self.config, request).await;
            if let Err(error) = &result {
                tracing::error!(
                    provider_id = %self.config.provider_id,
                    model_id = %self.config.model_id,
                    error = %error,
                    "completion request failed"
                );
            }
            result
        })
    }

    fn greet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move { Self::send_greeting(&self.config, name).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    #[test]
    fn adapter_requires_an_api_key() {
        let config = ProviderConfig::new(RIG_GEMINI_PROVIDER_ID, "  ", "");
        let result = RigGeminiAdapter::new(config);
        assert!(matches!(
            result,
            Err(ProviderError::MissingApiKey { provider_id, .. }) if provider_id == "gemini"
        ));
    }

    #[test]
    fn greeting_prompt_names_the_user() {
        assert_eq!(
            greeting_prompt("Ada Lovelace"),
            "Write a short, inspiring, one-sentence morning greeting for Ada Lovelace. Make it professional yet warm."
        );
    }

    #[test]
    fn generation_params_use_gemini_field_names() {
        let params = RigGeminiAdapter::generation_params(&GenerationSettings::default());
        assert_eq!(params["generationConfig"]["topK"], 40);
        assert_eq!(params["generationConfig"]["topP"], 0.95);
    }
}
