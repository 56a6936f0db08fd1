use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputState},
    v_flex,
};
use nexus_core::settings::{AppSettings, Preferences, ThemePreference};
use nexus_llm::default_gemini_models;

use super::state::SettingsState;

const ENV_KEY_NOTICE: &str =
    "GEMINI_API_KEY is set in the environment and takes precedence over the saved key.";
const ENV_MODEL_NOTICE: &str =
    "NEXUS_MODEL_ID is set in the environment and takes precedence over the saved model.";

pub struct SettingsView {
    state: Entity<SettingsState>,
    api_key_input: Entity<InputState>,
    model_input: Entity<InputState>,
    preferences: Preferences,
    theme: ThemePreference,
    error_message: Option<String>,
    saved: bool,
}

impl SettingsView {
    pub fn new(state: &Entity<SettingsState>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = state.read(cx).saved_settings();

        let api_key_input = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Gemini API key")
                .masked(true)
        });
        api_key_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.api_key.clone(), window, cx);
        });

        let model_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Model (e.g., gemini-2.5-flash)"));
        model_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.model_id.clone(), window, cx);
        });

        Self {
            state: state.clone(),
            api_key_input,
            model_input,
            preferences: settings.preferences,
            theme: settings.theme,
            error_message: None,
            saved: false,
        }
    }

    /// Discards unsaved edits.
    pub fn reload_from_settings(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let settings = self.state.read(cx).saved_settings();

        self.api_key_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.api_key.clone(), window, cx);
        });
        self.model_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.model_id.clone(), window, cx);
        });
        self.preferences = settings.preferences;
        self.theme = settings.theme;
        self.error_message = None;
        self.saved = false;
        cx.notify();
    }

    fn toggle_profile_visible(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.preferences.profile_visible = !self.preferences.profile_visible;
        self.saved = false;
        cx.notify();
    }

    fn toggle_workspace_sync(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.preferences.workspace_sync = !self.preferences.workspace_sync;
        self.saved = false;
        cx.notify();
    }

    fn select_light_mode(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.theme = ThemePreference::Light;
        self.saved = false;
        cx.notify();
    }

    fn select_dark_mode(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.theme = ThemePreference::Dark;
        self.saved = false;
        cx.notify();
    }

    fn save_settings(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        let current = self.state.read(cx).saved_settings();
        let new_settings = AppSettings {
            api_key: self.api_key_input.read(cx).value().to_string(),
            model_id: self.model_input.read(cx).value().to_string(),
            theme: self.theme,
            preferences: self.preferences,
            ..(*current).clone()
        };

        match self
            .state
            .update(cx, |state, cx| state.update_settings(new_settings, cx))
        {
            Ok(()) => {
                self.error_message = None;
                self.saved = true;
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to save settings");
                self.error_message = Some(format!("Failed to save settings: {error}"));
                self.saved = false;
            }
        }
        cx.notify();
    }

    fn cancel(&mut self, _: &ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        self.reload_from_settings(window, cx);
    }

    fn render_toggle_row(
        &self,
        id: &'static str,
        title: &'static str,
        description: &'static str,
        enabled: bool,
        on_click: impl Fn(&mut Self, &ClickEvent, &mut Window, &mut Context<Self>) + 'static,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .w_full()
            .items_center()
            .justify_between()
            .p_3()
            .rounded_md()
            .border_1()
            .border_color(theme.border)
            .child(
                v_flex()
                    .gap_1()
                    .child(div().text_sm().text_color(theme.foreground).child(title))
                    .child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(description),
                    ),
            )
            .child(
                Button::new(id)
                    .small()
                    .when(enabled, |button| button.primary())
                    .when(!enabled, |button| button.ghost())
                    .child(if enabled { "On" } else { "Off" })
                    .on_click(cx.listener(on_click)),
            )
            .into_any_element()
    }
}

fn model_hint() -> String {
    let ids = default_gemini_models()
        .into_iter()
        .map(|model| model.id)
        .collect::<Vec<_>>();
    format!("Known models: {}", ids.join(", "))
}

impl Render for SettingsView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let profile_visible = self.preferences.profile_visible;
        let workspace_sync = self.preferences.workspace_sync;
        let profile_row = self.render_toggle_row(
            "settings-profile-visible",
            "Profile Visibility",
            "Allow others to see your productivity score.",
            profile_visible,
            Self::toggle_profile_visible,
            cx,
        );
        let sync_row = self.render_toggle_row(
            "settings-workspace-sync",
            "Gemini Integration",
            "Sync with Google Calendar and Workspace.",
            workspace_sync,
            Self::toggle_workspace_sync,
            cx,
        );
        let config_path = self.state.read(cx).config_path_label();
        let key_from_env = self.state.read(cx).overridden_by_env("api_key");
        let model_from_env = self.state.read(cx).overridden_by_env("model_id");
        let theme = cx.theme();

        v_flex()
            .id("settings-view")
            .size_full()
            .gap_4()
            .p_6()
            .overflow_y_scroll()
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child("Account Settings"),
            )
            .child(
                v_flex()
                    .gap_2()
                    .child(div().text_sm().text_color(theme.muted_foreground).child("Preferences"))
                    .child(profile_row)
                    .child(sync_row),
            )
            .child(
                v_flex()
                    .gap_3()
                    .child(div().text_sm().text_color(theme.muted_foreground).child("Assistant"))
                    .child(
                        v_flex()
                            .gap_1()
                            .child(div().text_sm().text_color(theme.foreground).child("API Key"))
                            .child(Input::new(&self.api_key_input).w_full())
                            .when(key_from_env, |el| {
                                el.child(
                                    div()
                                        .text_xs()
                                        .text_color(theme.muted_foreground)
                                        .child(ENV_KEY_NOTICE),
                                )
                            }),
                    )
                    .child(
                        v_flex()
                            .gap_1()
                            .child(div().text_sm().text_color(theme.foreground).child("Model"))
                            .child(Input::new(&self.model_input).w_full())
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(model_hint()),
                            )
                            .when(model_from_env, |el| {
                                el.child(
                                    div()
                                        .text_xs()
                                        .text_color(theme.muted_foreground)
                                        .child(ENV_MODEL_NOTICE),
                                )
                            }),
                    ),
            )
            .child(
                v_flex()
                    .gap_1()
                    .child(div().text_sm().text_color(theme.foreground).child("Theme Mode"))
                    .child(
                        h_flex()
                            .gap_2()
                            .child(
                                Button::new("settings-theme-light")
                                    .small()
                                    .when(self.theme == ThemePreference::Light, |button| {
                                        button.primary()
                                    })
                                    .when(self.theme != ThemePreference::Light, |button| {
                                        button.ghost()
                                    })
                                    .child("Light")
                                    .on_click(cx.listener(Self::select_light_mode)),
                            )
                            .child(
                                Button::new("settings-theme-dark")
                                    .small()
                                    .when(self.theme == ThemePreference::Dark, |button| {
                                        button.primary()
                                    })
                                    .when(self.theme != ThemePreference::Dark, |button| {
                                        button.ghost()
                                    })
                                    .child("Dark")
                                    .on_click(cx.listener(Self::select_dark_mode)),
                            ),
                    ),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(format!("Stored in {config_path}")),
            )
            .when_some(self.error_message.clone(), |el, error| {
                el.child(div().text_sm().text_color(theme.danger).child(error))
            })
            .when(self.saved, |el| {
                el.child(
                    div()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child("Settings saved."),
                )
            })
            .child(
                h_flex()
                    .gap_2()
                    .justify_end()
                    .child(
                        Button::new("settings-cancel")
                            .ghost()
                            .small()
                            .child("Revert")
                            .on_click(cx.listener(Self::cancel)),
                    )
                    .child(
                        Button::new("settings-save")
                            .primary()
                            .small()
                            .child("Save")
                            .on_click(cx.listener(Self::save_settings)),
                    ),
            )
    }
}
