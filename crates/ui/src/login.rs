use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    v_flex,
};
use nexus_core::ConfigIssue;

/// Emitted with the raw ID token pasted from the Google sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSubmitted {
    pub token: String,
}

pub struct LoginView {
    token_input: Entity<InputState>,
    client_id_missing: bool,
    error: Option<SharedString>,
}

impl EventEmitter<CredentialSubmitted> for LoginView {}

impl LoginView {
    pub fn new(client_id_missing: bool, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let token_input = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Paste your Google ID token")
                .masked(true)
        });

        cx.subscribe_in(
            &token_input,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.submit(window, cx);
                }
            },
        )
        .detach();

        Self {
            token_input,
            client_id_missing,
            error: None,
        }
    }

    pub fn set_client_id_missing(&mut self, missing: bool, cx: &mut Context<Self>) {
        self.client_id_missing = missing;
        cx.notify();
    }

    pub fn set_error(&mut self, error: Option<String>, cx: &mut Context<Self>) {
        self.error = error.map(SharedString::from);
        cx.notify();
    }

    pub fn reset(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.token_input.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.error = None;
        cx.notify();
    }

    fn submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.client_id_missing {
            return;
        }

        let token = self.token_input.read(cx).value().trim().to_string();
        if token.is_empty() {
            return;
        }

        self.token_input.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        cx.emit(CredentialSubmitted { token });
    }

    fn render_config_notice(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let issue = ConfigIssue::MissingGoogleClientId;

        v_flex()
            .id("login-config-notice")
            .gap_2()
            .p_4()
            .rounded_lg()
            .border_1()
            .border_color(theme.danger)
            .child(
                div()
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.danger)
                    .child(issue.title()),
            )
            .child(
                div()
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child(issue.notice()),
            )
            .into_any_element()
    }

    fn render_sign_in(&self, cx: &Context<Self>) -> AnyElement {
        v_flex()
            .id("login-sign-in")
            .gap_3()
            .w_full()
            .child(Input::new(&self.token_input).w_full())
            .child(
                Button::new("login-google")
                    .primary()
                    .w_full()
                    .icon(IconName::CircleUser)
                    .child("Sign in with Google")
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.submit(window, cx);
                    })),
            )
            .into_any_element()
    }
}

impl Render for LoginView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let body = if self.client_id_missing {
            self.render_config_notice(cx)
        } else {
            self.render_sign_in(cx)
        };
        let theme = cx.theme();

        v_flex()
            .id("login-view")
            .size_full()
            .items_center()
            .justify_center()
            .bg(theme.background)
            .child(
                v_flex()
                    .w(px(420.))
                    .gap_6()
                    .p_8()
                    .rounded_xl()
                    .border_1()
                    .border_color(theme.border)
                    .items_center()
                    .child(
                        Icon::new(IconName::Bot)
                            .size(px(40.))
                            .text_color(theme.primary),
                    )
                    .child(
                        v_flex()
                            .items_center()
                            .gap_1()
                            .child(
                                div()
                                    .text_xl()
                                    .font_weight(FontWeight::BOLD)
                                    .text_color(theme.foreground)
                                    .child("Nexus AI"),
                            )
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.muted_foreground)
                                    .child("Your intelligent workspace for the modern era."),
                            ),
                    )
                    .child(body)
                    .when_some(self.error.clone(), |card, error| {
                        card.child(div().text_sm().text_color(theme.danger).child(error))
                    }),
            )
    }
}
