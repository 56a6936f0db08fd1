use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl Model {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

pub fn default_gemini_models() -> Vec<Model> {
    vec![
        Model::from_id(DEFAULT_GEMINI_MODEL).with_description("Fast default for chat and greetings"),
        Model::from_id("gemini-2.5-flash").with_description("Balanced cost/performance"),
        Model::from_id("gemini-2.5-pro").with_description("Higher quality, slower responses"),
    ]
}

/// Sampling parameters sent with every chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_leads_the_catalog() {
        let models = default_gemini_models();
        assert_eq!(models[0].id, DEFAULT_GEMINI_MODEL);
        assert!(models.iter().all(|model| model.description.is_some()));
    }
}
