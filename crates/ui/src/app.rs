use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, h_flex, v_flex};
use gpui_tokio_bridge::Tokio;
use nexus_core::chat::SubmissionId;
use nexus_core::settings::{AppSettings, ConfigIssue};
use nexus_core::{AppState, AppView, GreetingTicket, Identity, decode_id_token};
use nexus_llm::{
    CompletionProvider, ProviderError, ProviderResult, complete_with_timeout, create_provider,
};

use crate::chat::{ChatView, Submit};
use crate::dashboard;
use crate::login::{CredentialSubmitted, LoginView};
use crate::navigation::{LogoutClicked, NavSidebar, ViewSelected};
use crate::settings::{SettingsChanged, SettingsState, SettingsView, apply_theme};
use crate::tasks::{TaskAction, TasksView};

/// Fixed width of the navigation column.
pub const SIDEBAR_WIDTH: f32 = 240.0;
const HEADER_HEIGHT: f32 = 64.0;
const AVATAR_SIZE: f32 = 32.0;

gpui::actions!(
    nexus,
    [Quit, GoToDashboard, GoToChat, GoToTasks, GoToSettings]
);

/// Root view: login gate, navigation and the active page.
///
/// Owns the [`AppState`] and the completion provider. Child views only emit
/// events; every state change happens here and is pushed back down as snapshots.
pub struct NexusShell {
    /// Identity, active view, greeting, chat session and tasks.
    state: AppState,
    focus_handle: FocusHandle,
    settings_state: Entity<SettingsState>,
    /// `None` until settings yield a usable provider config.
    provider: Option<Arc<dyn CompletionProvider>>,
    provider_error: Option<String>,
    login: Entity<LoginView>,
    sidebar: Entity<NavSidebar>,
    chat_view: Entity<ChatView>,
    tasks_view: Entity<TasksView>,
    settings_view: Entity<SettingsView>,
    /// Dropping either task cancels the in-flight request.
    greeting_task: Option<Task<()>>,
    completion_task: Option<Task<()>>,
}

impl NexusShell {
    /// Builds the child views and wires their events back into the shell.
    ///
    /// Configuration gaps are logged once here and surfaced as notices in the
    /// login and chat views; they never prevent startup.
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings_state = SettingsState::new(cx);
        let settings = settings_state.read(cx).settings();
        for issue in settings.config_issues() {
            tracing::warn!(issue = issue.title(), "{}", issue.notice());
        }

        let login =
            cx.new(|cx| LoginView::new(settings.google_client_id().is_none(), window, cx));
        let sidebar = cx.new(NavSidebar::new);
        let chat_view = cx.new(|cx| ChatView::new(window, cx));
        let tasks_view = cx.new(|cx| TasksView::new(window, cx));
        let settings_view = cx.new(|cx| SettingsView::new(&settings_state, window, cx));
        let (provider, provider_error) = build_provider(&settings);

        // Child views only emit events; all state changes happen in the handlers below.
        cx.subscribe(&login, |this, _, event: &CredentialSubmitted, cx| {
            this.handle_credential(&event.token, cx);
        })
        .detach();

        cx.subscribe(&sidebar, |this, _, event: &ViewSelected, cx| {
            this.navigate(event.view, cx);
        })
        .detach();

        cx.subscribe_in(&sidebar, window, |this, _, _: &LogoutClicked, window, cx| {
            this.sign_out(window, cx);
        })
        .detach();

        cx.subscribe(&chat_view, |this, _, event: &Submit, cx| {
            this.handle_submit(event, cx);
        })
        .detach();

        cx.subscribe(&tasks_view, |this, _, event: &TaskAction, cx| {
            this.handle_task_action(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&settings_state, |this, _, event: &SettingsChanged, cx| {
            this.handle_settings_changed(&event.settings, cx);
        })
        .detach();

        let mut this = Self {
            state: AppState::new(),
            focus_handle: cx.focus_handle(),
            settings_state,
            provider,
            provider_error,
            login,
            sidebar,
            chat_view,
            tasks_view,
            settings_view,
            greeting_task: None,
            completion_task: None,
        };
        this.refresh_provider_views(&settings, cx);
        this.sync_views(cx);
        this
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Switches the content area. Ignored while signed out.
    pub(crate) fn navigate(&mut self, view: AppView, cx: &mut Context<Self>) {
        if !self.state.is_signed_in() {
            return;
        }

        self.state.navigate(view);
        self.sidebar.update(cx, |sidebar, cx| sidebar.set_active(view, cx));
        cx.notify();
    }

    /// Decodes the pasted ID token, signs in, and starts the greeting request.
    fn handle_credential(&mut self, token: &str, cx: &mut Context<Self>) {
        let settings = self.settings_state.read(cx).settings();

        match decode_id_token(token, settings.google_client_id()) {
            Ok(identity) => {
                let ticket = self.state.sign_in(identity);
                self.login.update(cx, |login, cx| login.set_error(None, cx));
                self.request_greeting(ticket, cx);
                self.sync_views(cx);
            }
            Err(error) => {
                tracing::warn!(error = %error, "rejected identity token");
                self.login.update(cx, |login, cx| {
                    login.set_error(Some("Sign-in failed. Please try again.".to_string()), cx);
                });
            }
        }
        cx.notify();
    }

    /// Asks the provider for a personalised greeting.
    ///
    /// The ticket ties the result to this sign-in; a result arriving after
    /// sign-out is dropped by [`AppState::apply_greeting`].
    fn request_greeting(&mut self, ticket: GreetingTicket, cx: &mut Context<Self>) {
        let Some(provider) = self.provider.clone() else {
            tracing::debug!("no completion provider, keeping default greeting");
            return;
        };

        // Network I/O runs on tokio; the result hops back to the UI thread.
        let name = ticket.name().to_string();
        let worker = Tokio::spawn(cx, async move { provider.greet(&name).await });

        self.greeting_task = Some(cx.spawn(async move |this, cx| {
            let outcome = worker
                .await
                .unwrap_or_else(|error| Err(interrupted("greeting-worker", &error)));
            let _ = this.update(cx, |this, cx| {
                if this.state.apply_greeting(&ticket, outcome) {
                    cx.notify();
                }
            });
        }));
    }

    /// Starts one chat round trip.
    ///
    /// The user turn is shown immediately. Without a provider the session is
    /// resolved at once with the configuration error.
    fn handle_submit(&mut self, event: &Submit, cx: &mut Context<Self>) {
        let pending = match self.state.session_mut().begin_submit(&event.content) {
            Ok(pending) => pending,
            Err(error) => {
                tracing::debug!(error = %error, "chat submit rejected");
                return;
            }
        };
        self.sync_chat(cx);

        let settings = self.settings_state.read(cx).settings();
        let Some(provider) = self.provider.clone() else {
            let outcome = Err(unavailable_provider(&settings));
            self.finish_completion(pending.id, outcome, cx);
            return;
        };

        let timeout = settings.request_timeout();
        let request = pending.request;
        let worker = Tokio::spawn(cx, async move {
            complete_with_timeout(provider.as_ref(), request, timeout).await
        });

        let submission = pending.id;
        self.completion_task = Some(cx.spawn(async move |this, cx| {
            let outcome = worker
                .await
                .unwrap_or_else(|error| Err(interrupted("completion-worker", &error)));
            let _ = this.update(cx, |this, cx| {
                this.finish_completion(submission, outcome, cx);
            });
        }));
    }

    /// Appends the assistant turn unless the submission is stale.
    fn finish_completion(
        &mut self,
        submission: SubmissionId,
        outcome: ProviderResult<String>,
        cx: &mut Context<Self>,
    ) {
        if let Err(error) = self.state.session_mut().resolve(submission, outcome) {
            if error.is_stale() {
                tracing::debug!(error = %error, "completion result dropped");
            } else {
                tracing::warn!(error = %error, "completion result rejected");
            }
            return;
        }
        self.sync_chat(cx);
    }

    fn handle_task_action(&mut self, action: TaskAction, cx: &mut Context<Self>) {
        let tasks = self.state.tasks_mut();
        match action {
            TaskAction::Toggle(id) => {
                tasks.toggle(&id);
            }
            TaskAction::Remove(id) => {
                if tasks.remove(&id).is_none() {
                    tracing::debug!(task_id = %id, "remove ignored for unknown task");
                }
            }
            TaskAction::Add { title, category } => {
                tasks.add(&title, category);
            }
        }
        self.sync_tasks(cx);
    }

    /// Reapplies the theme and rebuilds the provider from the new settings.
    fn handle_settings_changed(&mut self, settings: &AppSettings, cx: &mut Context<Self>) {
        apply_theme(settings, None, cx);
        cx.refresh_windows();

        let (provider, provider_error) = build_provider(settings);
        self.provider = provider;
        self.provider_error = provider_error;
        self.refresh_provider_views(settings, cx);
        cx.notify();
    }

    /// Cancels in-flight requests and returns to the login screen with fresh state.
    fn sign_out(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.greeting_task = None;
        self.completion_task = None;
        self.state.sign_out();
        self.login.update(cx, |login, cx| login.reset(window, cx));
        self.sync_views(cx);
        cx.notify();
    }

    /// Pushes configuration notices and the model label to the views that show them.
    fn refresh_provider_views(&mut self, settings: &AppSettings, cx: &mut Context<Self>) {
        let client_id_missing = settings.google_client_id().is_none();
        self.login.update(cx, |login, cx| {
            login.set_client_id_missing(client_id_missing, cx);
        });

        let notice = match (&self.provider, &self.provider_error) {
            (Some(_), _) => None,
            (None, _) if !settings.has_api_key() => {
                Some(ConfigIssue::MissingApiKey.notice().to_string())
            }
            (None, Some(error)) => Some(format!("Assistant unavailable: {error}")),
            (None, None) => Some(ConfigIssue::MissingApiKey.notice().to_string()),
        };
        let model_label = settings.model_id.clone();
        self.chat_view.update(cx, |chat, cx| {
            chat.set_notice(notice, cx);
            chat.set_model_label(model_label, cx);
        });
    }

    fn sync_views(&mut self, cx: &mut Context<Self>) {
        let view = self.state.view();
        self.sidebar.update(cx, |sidebar, cx| sidebar.set_active(view, cx));
        self.sync_chat(cx);
        self.sync_tasks(cx);
    }

    fn sync_chat(&mut self, cx: &mut Context<Self>) {
        let session = self.state.session();
        self.chat_view.update(cx, |chat, cx| chat.sync(session, cx));
        cx.notify();
    }

    fn sync_tasks(&mut self, cx: &mut Context<Self>) {
        let pending = self.state.pending_task_count();
        let tasks = self.state.tasks();
        self.tasks_view.update(cx, |view, cx| view.sync(tasks, cx));
        self.sidebar
            .update(cx, |sidebar, cx| sidebar.set_pending_tasks(pending, cx));
        cx.notify();
    }
}

/// Creates the provider, returning the error text for the chat notice on failure.
fn build_provider(
    settings: &AppSettings,
) -> (Option<Arc<dyn CompletionProvider>>, Option<String>) {
    match create_provider(settings.to_provider_config()) {
        Ok(provider) => {
            tracing::info!(
                provider = provider.id(),
                model = %settings.model_id,
                "completion provider ready"
            );
            (Some(provider), None)
        }
        Err(error) if error.is_configuration() => {
            tracing::warn!(error = %error, "completion provider not configured");
            (None, Some(error.to_string()))
        }
        Err(error) => {
            tracing::error!(error = %error, "failed to create completion provider");
            (None, Some(error.to_string()))
        }
    }
}

fn unavailable_provider(settings: &AppSettings) -> ProviderError {
    if settings.has_api_key() {
        ProviderError::UnsupportedProvider {
            stage: "submit-without-provider",
            provider_id: settings.provider_id.clone(),
        }
    } else {
        ProviderError::MissingApiKey {
            stage: "submit-without-provider",
            provider_id: settings.provider_id.clone(),
        }
    }
}

fn interrupted(stage: &'static str, error: &gpui_tokio_bridge::JoinError) -> ProviderError {
    ProviderError::Interrupted {
        stage,
        details: error.to_string(),
    }
}

impl Render for NexusShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let root = div()
            .id("nexus-shell")
            .track_focus(&self.focus_handle)
            .size_full()
            .on_action(cx.listener(|this, _: &GoToDashboard, _, cx| {
                this.navigate(AppView::Dashboard, cx);
            }))
            .on_action(cx.listener(|this, _: &GoToChat, _, cx| {
                this.navigate(AppView::Chat, cx);
            }))
            .on_action(cx.listener(|this, _: &GoToTasks, _, cx| {
                this.navigate(AppView::Tasks, cx);
            }))
            .on_action(cx.listener(|this, _: &GoToSettings, _, cx| {
                this.navigate(AppView::Settings, cx);
            }));

        if !self.state.is_signed_in() {
            return root.child(self.login.clone());
        }

        let content = match self.state.view() {
            AppView::Dashboard => dashboard::render(self, cx),
            AppView::Chat => self.chat_view.clone().into_any_element(),
            AppView::Tasks => self.tasks_view.clone().into_any_element(),
            AppView::Settings => self.settings_view.clone().into_any_element(),
        };
        let header = self.render_header(window, cx);
        let theme = cx.theme();

        root.child(
            h_flex()
                .size_full()
                .bg(theme.background)
                .child(
                    div()
                        .id("sidebar-container")
                        .h_full()
                        .flex_shrink_0()
                        .w(px(SIDEBAR_WIDTH))
                        .border_r_1()
                        .border_color(theme.border)
                        .child(self.sidebar.clone()),
                )
                .child(
                    v_flex()
                        .id("main-content")
                        .flex_1()
                        .h_full()
                        .min_w_0()
                        .min_h_0()
                        .overflow_hidden()
                        .child(header)
                        .child(div().flex_1().min_h_0().child(content)),
                ),
        )
    }
}

impl NexusShell {
    fn render_header(&self, _window: &Window, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let view = self.state.view();
        let settings = self.settings_state.read(cx).settings();
        let profile_visible = settings.preferences.profile_visible;
        let (name, subtitle) = match self.state.identity() {
            Some(identity) if profile_visible => (identity.name.clone(), identity.email.clone()),
            Some(_) => ("Private profile".to_string(), String::new()),
            None => (String::new(), String::new()),
        };
        let avatar = match self
            .state
            .identity()
            .and_then(|identity| avatar_source(identity, profile_visible))
        {
            Some(source) => img(source)
                .size(px(AVATAR_SIZE))
                .rounded_full()
                .into_any_element(),
            None => div()
                .size(px(AVATAR_SIZE))
                .rounded_full()
                .border_1()
                .border_color(theme.border)
                .bg(theme.muted)
                .flex()
                .items_center()
                .justify_center()
                .child(
                    Icon::new(IconName::CircleUser)
                        .size(px(18.))
                        .text_color(theme.foreground),
                )
                .into_any_element(),
        };

        h_flex()
            .id("app-header")
            .w_full()
            .h(px(HEADER_HEIGHT))
            .flex_shrink_0()
            .px_6()
            .items_center()
            .justify_between()
            .border_b_1()
            .border_color(theme.border)
            .child(
                div()
                    .text_sm()
                    .font_weight(FontWeight::BOLD)
                    .text_color(theme.muted_foreground)
                    .child(header_title(view)),
            )
            .child(
                h_flex()
                    .gap_3()
                    .items_center()
                    .child(
                        v_flex()
                            .items_end()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::BOLD)
                                    .text_color(theme.foreground)
                                    .child(name),
                            )
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(subtitle),
                            ),
                    )
                    .child(avatar),
            )
            .into_any_element()
    }
}

pub fn header_title(view: AppView) -> String {
    format!("Nexus / {}", view.slug())
}

/// Profile picture URL for the header, hidden along with the rest of the profile.
pub fn avatar_source(identity: &Identity, profile_visible: bool) -> Option<SharedString> {
    let picture = identity.picture.trim();
    (profile_visible && !picture.is_empty()).then(|| SharedString::from(picture.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_the_active_view() {
        assert_eq!(header_title(AppView::Chat), "Nexus / CHAT");
        assert_eq!(header_title(AppView::Settings), "Nexus / SETTINGS");
    }

    #[test]
    fn avatar_uses_the_decoded_picture_when_visible() {
        let identity = Identity {
            subject: "sub-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            picture: "https://example.com/ada.png".to_string(),
        };

        assert_eq!(
            avatar_source(&identity, true).as_deref(),
            Some("https://example.com/ada.png")
        );
        assert_eq!(avatar_source(&identity, false), None);

        let without_picture = Identity {
            picture: "  ".to_string(),
            ..identity
        };
        assert_eq!(avatar_source(&without_picture, true), None);
    }

    #[test]
    fn missing_key_is_reported_before_any_request() {
        let settings = AppSettings::default();
        let (provider, error) = build_provider(&settings);
        assert!(provider.is_none());
        assert!(error.is_some());
        assert!(matches!(
            unavailable_provider(&settings),
            ProviderError::MissingApiKey { .. }
        ));
    }
}
