use std::fmt;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Work,
    Personal,
    Urgent,
}

impl TaskCategory {
    pub const ALL: [Self; 3] = [Self::Work, Self::Personal, Self::Urgent];

    pub fn label(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub category: TaskCategory,
}

impl Task {
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        completed: bool,
        category: TaskCategory,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            completed,
            category,
        }
    }
}

/// In-memory task records; each one is toggled or removed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Starter objectives shown to a freshly signed-in user.
    pub fn seeded() -> Self {
        Self::new(vec![
            Task::new(
                TaskId::new("1"),
                "Complete presentation for team sync",
                false,
                TaskCategory::Work,
            ),
            Task::new(
                TaskId::new("2"),
                "Plan weekend trip to mountains",
                true,
                TaskCategory::Personal,
            ),
            Task::new(
                TaskId::new("3"),
                "Check quarterly reports",
                false,
                TaskCategory::Urgent,
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    /// Flips `completed` on the matching task. Returns false for unknown ids.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) else {
            tracing::debug!(task_id = %id, "toggle ignored for unknown task");
            return false;
        };

        task.completed = !task.completed;
        true
    }

    /// Appends a new open task. Blank titles are ignored.
    pub fn add(&mut self, title: &str, category: TaskCategory) -> Option<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        self.tasks
            .push(Task::new(TaskId::generate(), title, false, category));
        self.tasks.last()
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_touches_only_the_target() {
        let mut tasks = TaskList::seeded();
        let before = tasks.clone();

        assert!(tasks.toggle(&TaskId::new("1")));

        let toggled = tasks.get(&TaskId::new("1")).unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.title, before.as_slice()[0].title);
        assert_eq!(tasks.as_slice()[1..], before.as_slice()[1..]);
    }

    #[test]
    fn toggling_twice_restores_the_record() {
        let mut tasks = TaskList::seeded();
        let before = tasks.clone();
        tasks.toggle(&TaskId::new("2"));
        tasks.toggle(&TaskId::new("2"));
        assert_eq!(tasks, before);
    }

    #[test]
    fn unknown_id_changes_nothing() {
        let mut tasks = TaskList::seeded();
        let before = tasks.clone();
        assert!(!tasks.toggle(&TaskId::new("missing")));
        assert_eq!(tasks, before);
    }

    #[test]
    fn pending_count_tracks_completion() {
        let mut tasks = TaskList::seeded();
        assert_eq!(tasks.pending_count(), 2);
        tasks.toggle(&TaskId::new("3"));
        assert_eq!(tasks.pending_count(), 1);
    }

    #[test]
    fn add_trims_and_rejects_blank_titles() {
        let mut tasks = TaskList::default();
        assert!(tasks.add("   ", TaskCategory::Work).is_none());

        let added = tasks.add("  Ship release  ", TaskCategory::Urgent).unwrap().clone();
        assert_eq!(added.title, "Ship release");
        assert!(!added.completed);
        assert_eq!(added.category, TaskCategory::Urgent);

        let second = tasks.add("Write notes", TaskCategory::Personal).unwrap().clone();
        assert_ne!(added.id, second.id);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn remove_returns_the_record() {
        let mut tasks = TaskList::seeded();
        let removed = tasks.remove(&TaskId::new("2")).unwrap();
        assert_eq!(removed.title, "Plan weekend trip to mountains");
        assert_eq!(tasks.len(), 2);
        assert!(tasks.remove(&TaskId::new("2")).is_none());
    }
}
