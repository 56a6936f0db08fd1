use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};

use crate::chat::events::Submit;

pub struct MessageInput {
    input_state: Entity<InputState>,
    awaiting: bool,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Ask Nexus anything...")
                .clean_on_escape()
                .auto_grow(1, 6)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                let InputEvent::PressEnter { secondary } = event else {
                    return;
                };

                if *secondary {
                    this.pending_newline = false;
                } else if this.pending_newline {
                    // Shift+Enter already inserted the newline.
                    this.pending_newline = false;
                } else {
                    this.trim_trailing_newline(window, cx);
                    this.handle_submit(window, cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            awaiting: false,
            pending_newline: false,
        }
    }

    pub fn set_awaiting(&mut self, awaiting: bool, cx: &mut Context<Self>) {
        if self.awaiting == awaiting {
            return;
        }

        self.awaiting = awaiting;
        self.pending_newline = false;
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.pending_newline = false;
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.awaiting {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.awaiting {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        if content.trim().is_empty() {
            return;
        }

        cx.emit(Submit::new(content));
        self.clear(window, cx);
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let awaiting = self.awaiting;

        v_flex().bg(theme.background).p_3().child(
            h_flex()
                .w_full()
                .gap_2()
                .items_end()
                .px_3()
                .py_2()
                .rounded_lg()
                .border_1()
                .border_color(theme.border)
                .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                    if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                        this.handle_shift_enter(window, cx);
                    }
                }))
                .child(
                    div()
                        .flex_1()
                        .min_w_0()
                        .child(Input::new(&self.input_state).w_full().disabled(awaiting)),
                )
                .child(
                    Button::new("send")
                        .small()
                        .primary()
                        .icon(IconName::ArrowUp)
                        .disabled(awaiting)
                        .on_click(cx.listener(|this, _, window, cx| {
                            this.handle_submit(window, cx);
                        })),
                ),
        )
    }
}
