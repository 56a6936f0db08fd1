use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use nexus_core::AppView;

use crate::app::NexusShell;

struct InfoCard {
    icon: IconName,
    title: &'static str,
    body: &'static str,
}

const INFO_CARDS: [InfoCard; 3] = [
    InfoCard {
        icon: IconName::Calendar,
        title: "Schedule",
        body: "Next meeting in 45 minutes: Product Sync with Design Team.",
    },
    InfoCard {
        icon: IconName::ChartPie,
        title: "Efficiency",
        body: "You completed 85% of your planned tasks yesterday. Keep it up!",
    },
    InfoCard {
        icon: IconName::Bot,
        title: "AI Summary",
        body: "Gemini analyzed your recent emails: no urgent requests detected.",
    },
];

pub fn pending_summary(pending: usize) -> String {
    let noun = if pending == 1 { "task" } else { "tasks" };
    format!(
        "Your dashboard is optimized and synchronized. You have {pending} pending {noun} for today."
    )
}

pub(crate) fn render(shell: &NexusShell, cx: &mut Context<NexusShell>) -> AnyElement {
    let state = shell.state();
    let first_name = state
        .identity()
        .map(|identity| identity.first_name().to_string())
        .unwrap_or_default();
    let greeting = state.greeting().to_string();
    let summary = pending_summary(state.pending_task_count());
    let theme = cx.theme();

    v_flex()
        .id("dashboard")
        .size_full()
        .gap_6()
        .p_6()
        .overflow_y_scroll()
        .child(
            v_flex()
                .gap_3()
                .p_8()
                .rounded_xl()
                .border_1()
                .border_color(theme.border)
                .bg(theme.muted)
                .child(
                    div()
                        .text_2xl()
                        .font_weight(FontWeight::BLACK)
                        .text_color(theme.foreground)
                        .child(format!("Hi {first_name},")),
                )
                .child(
                    div()
                        .text_xl()
                        .font_weight(FontWeight::BOLD)
                        .text_color(theme.primary)
                        .child(greeting),
                )
                .child(
                    div()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child(summary),
                )
                .child(
                    h_flex().pt_2().child(
                        Button::new("dashboard-start-session")
                            .primary()
                            .child("Start New Session")
                            .on_click(cx.listener(|this, _, _, cx| {
                                this.navigate(AppView::Chat, cx);
                            })),
                    ),
                ),
        )
        .child(
            h_flex()
                .w_full()
                .gap_4()
                .items_start()
                .children(INFO_CARDS.iter().map(|card| {
                    v_flex()
                        .flex_1()
                        .gap_2()
                        .p_6()
                        .rounded_xl()
                        .border_1()
                        .border_color(theme.border)
                        .child(
                            Icon::new(card.icon.clone())
                                .size(px(20.))
                                .text_color(theme.primary),
                        )
                        .child(
                            div()
                                .text_lg()
                                .font_weight(FontWeight::BOLD)
                                .text_color(theme.foreground)
                                .child(card.title),
                        )
                        .child(
                            div()
                                .text_sm()
                                .text_color(theme.muted_foreground)
                                .child(card.body),
                        )
                })),
        )
        .into_any_element()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_pluralizes_task_count() {
        assert!(pending_summary(1).ends_with("1 pending task for today."));
        assert!(pending_summary(2).ends_with("2 pending tasks for today."));
    }
}
