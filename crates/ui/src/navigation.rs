use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use nexus_core::AppView;

/// Emitted when a navigation entry is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSelected {
    pub view: AppView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutClicked;

pub struct NavSidebar {
    active: AppView,
    pending_tasks: usize,
}

impl EventEmitter<ViewSelected> for NavSidebar {}
impl EventEmitter<LogoutClicked> for NavSidebar {}

impl NavSidebar {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            active: AppView::default(),
            pending_tasks: 0,
        }
    }

    pub fn set_active(&mut self, view: AppView, cx: &mut Context<Self>) {
        self.active = view;
        cx.notify();
    }

    pub fn set_pending_tasks(&mut self, pending: usize, cx: &mut Context<Self>) {
        self.pending_tasks = pending;
        cx.notify();
    }
}

pub fn view_icon(view: AppView) -> IconName {
    match view {
        AppView::Dashboard => IconName::LayoutDashboard,
        AppView::Chat => IconName::Bot,
        AppView::Tasks => IconName::CircleCheck,
        AppView::Settings => IconName::Settings,
    }
}

impl Render for NavSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let active = self.active;
        let pending_tasks = self.pending_tasks;

        v_flex()
            .id("nav-sidebar")
            .size_full()
            .justify_between()
            .py_4()
            .px_3()
            .child(
                v_flex()
                    .gap_1()
                    .child(
                        h_flex()
                            .gap_2()
                            .items_center()
                            .px_2()
                            .pb_4()
                            .child(
                                Icon::new(IconName::Bot)
                                    .size(px(20.))
                                    .text_color(theme.primary),
                            )
                            .child(
                                div()
                                    .text_lg()
                                    .font_weight(FontWeight::BOLD)
                                    .text_color(theme.foreground)
                                    .child("Nexus"),
                            ),
                    )
                    .children(AppView::ALL.into_iter().map(|view| {
                        let is_active = view == active;
                        let label = match view {
                            AppView::Tasks if pending_tasks > 0 => {
                                format!("{} ({pending_tasks})", view.label())
                            }
                            _ => view.label().to_string(),
                        };

                        Button::new(SharedString::from(format!("nav-{}", view.slug())))
                            .w_full()
                            .small()
                            .when(is_active, |button| button.primary())
                            .when(!is_active, |button| button.ghost())
                            .icon(view_icon(view))
                            .child(label)
                            .on_click(cx.listener(move |_, _, _, cx| {
                                cx.emit(ViewSelected { view });
                            }))
                    })),
            )
            .child(
                Button::new("nav-logout")
                    .w_full()
                    .small()
                    .ghost()
                    .icon(IconName::ArrowLeft)
                    .child("Logout")
                    .on_click(cx.listener(|_, _, _, cx| {
                        cx.emit(LogoutClicked);
                    })),
            )
    }
}
