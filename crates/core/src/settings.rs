use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use nexus_llm::{DEFAULT_GEMINI_MODEL, GenerationSettings, ProviderConfig, RIG_GEMINI_PROVIDER_ID};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "nexus";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "NEXUS_";
/// Value shipped in sample env files; treated as unset.
pub const CLIENT_ID_PLACEHOLDER: &str = "your_google_client_id_here";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "enabled")]
    pub profile_visible: bool,
    #[serde(default = "enabled")]
    pub workspace_sync: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            profile_visible: true,
            workspace_sync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub google_client_id: String,
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Upper bound for one completion; `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub theme: ThemePreference,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: String::new(),
            model_id: default_model_id(),
            request_timeout_secs: None,
            generation: GenerationSettings::default(),
            theme: ThemePreference::default(),
            preferences: Preferences::default(),
        }
    }
}

/// Configuration gaps surfaced as persistent notices instead of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssue {
    MissingGoogleClientId,
    MissingApiKey,
}

impl ConfigIssue {
    pub fn title(self) -> &'static str {
        match self {
            Self::MissingGoogleClientId => "Missing Google Client ID",
            Self::MissingApiKey => "Missing Gemini API key",
        }
    }

    pub fn notice(self) -> &'static str {
        match self {
            Self::MissingGoogleClientId => {
                "Set GOOGLE_CLIENT_ID (or google_client_id in settings.json) to enable Google sign-in."
            }
            Self::MissingApiKey => {
                "Set GEMINI_API_KEY or add an API key in Settings to enable the assistant."
            }
        }
    }
}

impl AppSettings {
    pub fn google_client_id(&self) -> Option<&str> {
        let client_id = self.google_client_id.trim();
        if client_id.is_empty() || client_id.contains(CLIENT_ID_PLACEHOLDER) {
            None
        } else {
            Some(client_id)
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn config_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.google_client_id().is_none() {
            issues.push(ConfigIssue::MissingGoogleClientId);
        }
        if !self.has_api_key() {
            issues.push(ConfigIssue::MissingApiKey);
        }
        issues
    }

    /// Provider config for the completion client; always built so a missing key
    /// is reported by the client itself.
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(&self.provider_id, &self.api_key, &self.endpoint)
            .with_model(self.model_id.clone())
            .with_generation(self.generation)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn normalized(mut self) -> Self {
        self.google_client_id = self.google_client_id.trim().to_string();
        self.provider_id = if self.provider_id.trim().is_empty() {
            default_provider_id()
        } else {
            self.provider_id.trim().to_string()
        };
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = self.endpoint.trim().to_string();
        self.model_id = if self.model_id.trim().is_empty() {
            default_model_id()
        } else {
            self.model_id.trim().to_string()
        };
        self
    }

    /// Defaults plus the settings file. This is the only layer ever written back.
    pub fn file_figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppSettings::default())).merge(Json::file(path))
    }

    /// Environment overrides, applied on top of the file layer.
    pub fn env_figment() -> Figment {
        Figment::new()
            .merge(Env::raw().only(&["google_client_id", "api_key"]))
            .merge(Env::raw().only(&["gemini_api_key"]).map(|_| "api_key".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load_file(path: &Path) -> Self {
        match Self::file_figment(path).extract::<AppSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = ?path,
                    error = %error,
                    "failed to read settings, using defaults"
                );
                AppSettings::default()
            }
        }
    }

    /// Returns these settings with the environment layered on top.
    pub fn with_env(self) -> Self {
        let merged = Figment::from(Serialized::defaults(&self))
            .merge(Self::env_figment())
            .extract::<AppSettings>();

        match merged {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(error = %error, "ignoring unreadable environment overrides");
                self
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        Self::load_file(path).with_env()
    }
}

/// Top-level settings keys currently supplied by the environment.
fn env_keys() -> BTreeSet<String> {
    match AppSettings::env_figment().data() {
        Ok(profiles) => profiles
            .into_values()
            .flat_map(|dict| dict.into_keys())
            .collect(),
        Err(error) => {
            tracing::warn!(error = %error, "failed to read environment overrides");
            BTreeSet::new()
        }
    }
}

/// Settings as saved on disk plus the effective snapshot with env overrides.
pub struct SettingsStore {
    saved: ArcSwap<AppSettings>,
    settings: ArcSwap<AppSettings>,
    env_keys: BTreeSet<String>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".nexus"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let saved = AppSettings::load_file(&config_path);
        if !config_path.exists() {
            tracing::info!(path = ?config_path, "settings file not found, using defaults and environment");
        }

        let env_keys = env_keys();
        if !env_keys.is_empty() {
            tracing::debug!(keys = ?env_keys, "environment overrides settings file");
        }

        Self {
            settings: ArcSwap::from_pointee(saved.clone().with_env()),
            saved: ArcSwap::from_pointee(saved),
            env_keys,
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Effective settings: file layer plus environment overrides.
    pub fn settings(&self) -> Arc<AppSettings> {
        self.settings.load_full()
    }

    /// The file layer alone; edit this and hand it back to [`Self::update`].
    pub fn saved_settings(&self) -> Arc<AppSettings> {
        self.saved.load_full()
    }

    /// True when `key` (e.g. `"api_key"`) is set by the environment, so edits
    /// to the saved value have no effect until the variable is unset.
    pub fn overridden_by_env(&self, key: &str) -> bool {
        self.env_keys.contains(key)
    }

    /// Persists `saved` as the new file layer and returns the effective settings.
    pub fn update(&self, saved: AppSettings) -> Result<Arc<AppSettings>, SettingsError> {
        let saved = saved.normalized();
        self.persist(&saved)?;

        let effective = Arc::new(saved.clone().with_env());
        self.saved.store(Arc::new(saved));
        self.settings.store(effective.clone());
        Ok(effective)
    }

    fn persist(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!(path = ?self.config_path, "saved settings");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_provider_id() -> String {
    RIG_GEMINI_PROVIDER_ID.to_string()
}

fn default_model_id() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn enabled() -> bool {
    true
}
