//! Remote text completion for Nexus.
//!
//! Each call is one request/response; the crate keeps no conversation state.

use std::sync::Arc;

mod model;
mod provider;
mod rig_adapter;

pub use model::{DEFAULT_GEMINI_MODEL, GenerationSettings, Model, default_gemini_models};
pub use provider::{
    BoxFuture, CompletionProvider, CompletionRequest, ProviderConfig, ProviderError,
    ProviderMessage, ProviderResult, Role, complete_with_timeout,
};
pub use rig_adapter::{RIG_GEMINI_PROVIDER_ID, RigGeminiAdapter, greeting_prompt};

pub fn create_provider(mut config: ProviderConfig) -> ProviderResult<Arc<dyn CompletionProvider>> {
    if config.provider_id.trim().is_empty() {
        config.provider_id = RIG_GEMINI_PROVIDER_ID.to_string();
    }

    match config.provider_id.as_str() {
        "gemini" | "google" | "rig-gemini" => {
            config.provider_id = RIG_GEMINI_PROVIDER_ID.to_string();
            Ok(Arc::new(RigGeminiAdapter::new(config)?))
        }
        _ => Err(ProviderError::UnsupportedProvider {
            stage: "create-provider",
            provider_id: config.provider_id,
        }),
    }
}
