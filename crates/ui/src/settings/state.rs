use std::sync::Arc;

use gpui::*;
use gpui_component::{Theme, ThemeMode};
use nexus_core::settings::{AppSettings, SettingsError, SettingsStore, ThemePreference};

pub fn theme_mode(preference: ThemePreference) -> ThemeMode {
    match preference {
        ThemePreference::Light => ThemeMode::Light,
        ThemePreference::Dark => ThemeMode::Dark,
    }
}

pub fn apply_theme(settings: &AppSettings, window: Option<&mut Window>, cx: &mut App) {
    Theme::change(theme_mode(settings.theme), window, cx);
}

/// Live settings shared by every view in the window.
pub struct SettingsState {
    store: SettingsStore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChanged {
    pub settings: Arc<AppSettings>,
}

impl EventEmitter<SettingsChanged> for SettingsState {}

impl SettingsState {
    pub fn new(cx: &mut App) -> Entity<Self> {
        cx.new(|_| Self {
            store: SettingsStore::load(),
        })
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        self.store.settings()
    }

    /// What the settings form edits; never contains environment values.
    pub fn saved_settings(&self) -> Arc<AppSettings> {
        self.store.saved_settings()
    }

    pub fn overridden_by_env(&self, key: &str) -> bool {
        self.store.overridden_by_env(key)
    }

    pub fn config_path_label(&self) -> String {
        self.store.config_path().display().to_string()
    }

    pub fn update_settings(
        &mut self,
        settings: AppSettings,
        cx: &mut Context<Self>,
    ) -> Result<(), SettingsError> {
        let settings = self.store.update(settings)?;
        cx.emit(SettingsChanged { settings });
        cx.notify();
        Ok(())
    }
}
