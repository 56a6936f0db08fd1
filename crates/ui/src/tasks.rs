use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    v_flex,
};
use nexus_core::{Task, TaskCategory, TaskId, TaskList};

/// Task edits requested from the view; the shell owns the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Toggle(TaskId),
    Remove(TaskId),
    Add {
        title: String,
        category: TaskCategory,
    },
}

pub struct TasksView {
    tasks: Vec<Task>,
    title_input: Entity<InputState>,
    category: TaskCategory,
}

impl EventEmitter<TaskAction> for TasksView {}

impl TasksView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let title_input = cx.new(|cx| InputState::new(window, cx).placeholder("New task..."));

        cx.subscribe_in(
            &title_input,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.add_task(window, cx);
                }
            },
        )
        .detach();

        Self {
            tasks: Vec::new(),
            title_input,
            category: TaskCategory::Work,
        }
    }

    pub fn sync(&mut self, tasks: &TaskList, cx: &mut Context<Self>) {
        self.tasks = tasks.as_slice().to_vec();
        cx.notify();
    }

    fn add_task(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let title = self.title_input.read(cx).value().trim().to_string();
        if title.is_empty() {
            return;
        }

        self.title_input.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        cx.emit(TaskAction::Add {
            title,
            category: self.category,
        });
    }

    fn render_task(&self, index: usize, task: &Task, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let category_color = match task.category {
            TaskCategory::Urgent => theme.danger,
            TaskCategory::Work => theme.primary,
            TaskCategory::Personal => theme.muted_foreground,
        };
        let toggle_id = task.id.clone();
        let remove_id = task.id.clone();

        h_flex()
            .id(("task-row", index))
            .w_full()
            .items_center()
            .justify_between()
            .p_4()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .gap_3()
                    .items_center()
                    .child(
                        Button::new(("task-toggle", index))
                            .small()
                            .when(task.completed, |button| button.primary().icon(IconName::Check))
                            .when(!task.completed, |button| button.ghost().icon(IconName::Minus))
                            .on_click(cx.listener(move |_, _, _, cx| {
                                cx.emit(TaskAction::Toggle(toggle_id.clone()));
                            })),
                    )
                    .child(
                        v_flex()
                            .gap_1()
                            .child(
                                Label::new(task.title.clone())
                                    .text_sm()
                                    .when(task.completed, |label| {
                                        label.line_through().text_color(theme.muted_foreground)
                                    })
                                    .when(!task.completed, |label| {
                                        label.text_color(theme.foreground)
                                    }),
                            )
                            .child(
                                Label::new(task.category.label().to_uppercase())
                                    .text_xs()
                                    .text_color(category_color),
                            ),
                    ),
            )
            .child(
                Button::new(("task-remove", index))
                    .ghost()
                    .small()
                    .icon(IconName::Close)
                    .on_click(cx.listener(move |_, _, _, cx| {
                        cx.emit(TaskAction::Remove(remove_id.clone()));
                    })),
            )
            .into_any_element()
    }
}

impl Render for TasksView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let rows = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| self.render_task(index, task, cx))
            .collect::<Vec<_>>();
        let selected = self.category;
        let is_empty = self.tasks.is_empty();
        let theme = cx.theme();

        v_flex()
            .id("tasks-view")
            .size_full()
            .gap_4()
            .p_6()
            .overflow_y_scroll()
            .child(
                div()
                    .text_xl()
                    .font_weight(FontWeight::BOLD)
                    .text_color(theme.foreground)
                    .child("Daily Objectives"),
            )
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_center()
                    .child(div().flex_1().child(Input::new(&self.title_input).w_full()))
                    .children(TaskCategory::ALL.into_iter().map(|category| {
                        Button::new(SharedString::from(format!(
                            "task-category-{}",
                            category.label()
                        )))
                        .small()
                        .when(category == selected, |button| button.primary())
                        .when(category != selected, |button| button.ghost())
                        .child(category.label())
                        .on_click(cx.listener(move |this, _, _, cx| {
                            this.category = category;
                            cx.notify();
                        }))
                    }))
                    .child(
                        Button::new("task-add")
                            .small()
                            .primary()
                            .icon(IconName::Plus)
                            .child("New Task")
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.add_task(window, cx);
                            })),
                    ),
            )
            .when(is_empty, |view| {
                view.child(
                    div()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child("Nothing planned yet."),
                )
            })
            .children(rows)
    }
}
