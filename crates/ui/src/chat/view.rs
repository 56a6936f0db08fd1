use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, v_flex};
use nexus_core::chat::ChatSession;

use crate::chat::{MessageInput, MessageList, Submit};

/// Chat surface: transcript, input and configuration notice.
///
/// The view never edits the transcript; it forwards `Submit` to the shell and
/// redraws from the snapshots pushed back through [`ChatView::sync`].
pub struct ChatView {
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    model_label: SharedString,
    notice: Option<SharedString>,
}

impl EventEmitter<Submit> for ChatView {}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&message_input, |_, _, event: &Submit, cx| {
            cx.emit(event.clone());
        })
        .detach();

        Self {
            message_list,
            message_input,
            model_label: SharedString::default(),
            notice: None,
        }
    }

    pub fn sync(&mut self, session: &ChatSession, cx: &mut Context<Self>) {
        let awaiting = session.is_awaiting();
        self.message_list.update(cx, |list, cx| {
            list.set_turns(session.turns(), awaiting, cx);
        });
        self.message_input.update(cx, |input, cx| {
            input.set_awaiting(awaiting, cx);
        });
        cx.notify();
    }

    pub fn set_model_label(&mut self, label: impl Into<SharedString>, cx: &mut Context<Self>) {
        self.model_label = label.into();
        cx.notify();
    }

    /// Persistent banner shown while the assistant cannot be reached.
    pub fn set_notice(&mut self, notice: Option<String>, cx: &mut Context<Self>) {
        self.notice = notice.map(SharedString::from);
        cx.notify();
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("chat-view-header")
                    .flex_shrink_0()
                    .w_full()
                    .px_4()
                    .py_3()
                    .justify_between()
                    .items_center()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        v_flex()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .text_color(theme.foreground)
                                    .child("Nexus Assistant"),
                            )
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(self.model_label.clone()),
                            ),
                    ),
            )
            .when_some(self.notice.clone(), |view, notice| {
                view.child(
                    div()
                        .id("chat-view-notice")
                        .flex_shrink_0()
                        .mx_4()
                        .mt_3()
                        .px_3()
                        .py_2()
                        .rounded_md()
                        .border_1()
                        .border_color(theme.danger)
                        .text_sm()
                        .text_color(theme.danger)
                        .child(notice),
                )
            })
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
