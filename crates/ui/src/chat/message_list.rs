use chrono::{DateTime, Local, TimeZone, Utc};
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};
use nexus_core::chat::{Role, Turn};

const BUBBLE_MAX_WIDTH: Pixels = px(560.);
const BUBBLE_PADDING_X: Pixels = px(14.);
const BUBBLE_PADDING_Y: Pixels = px(10.);

/// Read-only rendering of a transcript snapshot.
pub struct MessageList {
    turns: Vec<Turn>,
    awaiting: bool,
    scroll_handle: ScrollHandle,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            turns: Vec::new(),
            awaiting: false,
            scroll_handle: ScrollHandle::new(),
        }
    }

    pub fn set_turns(&mut self, turns: &[Turn], awaiting: bool, cx: &mut Context<Self>) {
        let grew = turns.len() > self.turns.len() || (awaiting && !self.awaiting);
        let replaced = match (turns.first(), self.turns.first()) {
            (Some(new), Some(old)) => new.id != old.id,
            _ => true,
        };

        self.turns = turns.to_vec();
        self.awaiting = awaiting;

        if grew || replaced {
            self.scroll_handle.scroll_to_bottom();
        }
        cx.notify();
    }

    fn render_turn(&self, turn: &Turn, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let time = time_label(turn.created_at, &Local);

        match turn.role {
            Role::User => v_flex()
                .w_full()
                .items_end()
                .gap_1()
                .child(
                    div()
                        .max_w(BUBBLE_MAX_WIDTH)
                        .px(BUBBLE_PADDING_X)
                        .py(BUBBLE_PADDING_Y)
                        .rounded_lg()
                        .bg(theme.primary)
                        .text_color(theme.primary_foreground)
                        .child(Label::new(turn.text.clone()).text_sm()),
                )
                .child(
                    Label::new(time)
                        .text_xs()
                        .text_color(theme.muted_foreground),
                )
                .into_any_element(),
            Role::Assistant => v_flex()
                .w_full()
                .items_start()
                .gap_1()
                .child(
                    div()
                        .max_w(BUBBLE_MAX_WIDTH)
                        .px(BUBBLE_PADDING_X)
                        .py(BUBBLE_PADDING_Y)
                        .rounded_lg()
                        .border_1()
                        .border_color(theme.border)
                        .bg(theme.muted)
                        .text_color(theme.foreground)
                        .child(Label::new(turn.text.clone()).text_sm()),
                )
                .child(
                    Label::new(time)
                        .text_xs()
                        .text_color(theme.muted_foreground),
                )
                .into_any_element(),
        }
    }

    fn render_thinking(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("message-list-thinking")
            .gap_2()
            .items_center()
            .px(BUBBLE_PADDING_X)
            .py(BUBBLE_PADDING_Y)
            .rounded_lg()
            .bg(theme.muted)
            .child(div().size(px(8.)).rounded_full().bg(theme.primary))
            .child(
                Label::new("Nexus is thinking...")
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let rows = self
            .turns
            .iter()
            .map(|turn| self.render_turn(turn, cx))
            .collect::<Vec<_>>();
        let thinking = self.awaiting.then(|| self.render_thinking(cx));

        div()
            .id("message-list")
            .size_full()
            .min_h_0()
            .overflow_y_scroll()
            .track_scroll(&self.scroll_handle)
            .child(
                v_flex()
                    .w_full()
                    .px_4()
                    .py_3()
                    .gap_4()
                    .children(rows)
                    .when_some(thinking, |list, thinking| list.child(thinking)),
            )
    }
}

fn time_label<Tz>(at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(zone).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_label_uses_hours_and_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 42).unwrap();
        assert_eq!(time_label(at, &Utc), "09:07");
    }
}
