use nexus_llm::ProviderResult;

use crate::chat::ChatSession;
use crate::identity::Identity;
use crate::tasks::TaskList;

/// Shown until a personalised greeting arrives, and whenever it fails.
pub const DEFAULT_GREETING: &str = "Welcome back!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppView {
    #[default]
    Dashboard,
    Chat,
    Tasks,
    Settings,
}

impl AppView {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Chat, Self::Tasks, Self::Settings];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Chat => "AI Chat",
            Self::Tasks => "Tasks",
            Self::Settings => "Settings",
        }
    }

    /// Upper-cased id used in the header breadcrumb.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "DASHBOARD",
            Self::Chat => "CHAT",
            Self::Tasks => "TASKS",
            Self::Settings => "SETTINGS",
        }
    }
}

/// Binds an in-flight greeting request to the sign-in that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingTicket {
    generation: u64,
    name: String,
}

impl GreetingTicket {
    /// Name to personalise the greeting with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Everything the shell shows for one interactive session.
#[derive(Debug, Clone)]
pub struct AppState {
    identity: Option<Identity>,
    view: AppView,
    greeting: String,
    session: ChatSession,
    tasks: TaskList,
    sign_in_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            identity: None,
            view: AppView::Dashboard,
            greeting: DEFAULT_GREETING.to_string(),
            session: ChatSession::new(),
            tasks: TaskList::seeded(),
            sign_in_generation: 0,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskList {
        &mut self.tasks
    }

    pub fn pending_task_count(&self) -> usize {
        self.tasks.pending_count()
    }

    pub fn navigate(&mut self, view: AppView) {
        if self.view != view {
            tracing::debug!(from = self.view.slug(), to = view.slug(), "navigate");
        }
        self.view = view;
    }

    pub fn sign_in(&mut self, identity: Identity) -> GreetingTicket {
        self.sign_in_generation = self.sign_in_generation.saturating_add(1);
        self.greeting = DEFAULT_GREETING.to_string();

        tracing::info!(subject = %identity.subject, "signed in");

        let ticket = GreetingTicket {
            generation: self.sign_in_generation,
            name: identity.name.clone(),
        };
        self.identity = Some(identity);
        ticket
    }

    /// Installs the greeting for `ticket`. Returns whether the text changed.
    pub fn apply_greeting(
        &mut self,
        ticket: &GreetingTicket,
        outcome: ProviderResult<String>,
    ) -> bool {
        if !self.is_signed_in() || ticket.generation != self.sign_in_generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.sign_in_generation,
                "dropping greeting for an earlier sign-in"
            );
            return false;
        }

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                self.greeting = text.trim().to_string();
                true
            }
            Ok(_) => {
                tracing::warn!("greeting came back empty, keeping default");
                false
            }
            Err(error) => {
                tracing::warn!(error = %error, "greeting failed, keeping default");
                false
            }
        }
    }

    pub fn sign_out(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(subject = %identity.subject, "signed out");
        }
        // Bumping the generation invalidates any greeting still in flight.
        self.sign_in_generation = self.sign_in_generation.saturating_add(1);
        self.view = AppView::Dashboard;
        self.greeting = DEFAULT_GREETING.to_string();
        self.session.reset();
        self.tasks = TaskList::seeded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskId;
    use nexus_llm::ProviderError;

    fn ada() -> Identity {
        Identity {
            subject: "1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            picture: String::new(),
        }
    }

    #[test]
    fn starts_signed_out_on_dashboard() {
        let state = AppState::new();
        assert!(!state.is_signed_in());
        assert_eq!(state.view(), AppView::Dashboard);
        assert_eq!(state.greeting(), DEFAULT_GREETING);
        assert_eq!(state.pending_task_count(), 2);
    }

    #[test]
    fn greeting_applies_for_current_ticket() {
        let mut state = AppState::new();
        let ticket = state.sign_in(ada());
        assert_eq!(ticket.name(), "Ada Lovelace");

        assert!(state.apply_greeting(&ticket, Ok(" Good morning, Ada. ".to_string())));
        assert_eq!(state.greeting(), "Good morning, Ada.");
    }

    #[test]
    fn failed_or_blank_greeting_keeps_default() {
        let mut state = AppState::new();
        let ticket = state.sign_in(ada());

        assert!(!state.apply_greeting(&ticket, Ok("   ".to_string())));
        assert!(!state.apply_greeting(
            &ticket,
            Err(ProviderError::MissingApiKey {
                stage: "test",
                provider_id: "gemini".to_string(),
            })
        ));
        assert_eq!(state.greeting(), DEFAULT_GREETING);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut state = AppState::new();
        let first = state.sign_in(ada());
        state.sign_out();
        let second = state.sign_in(ada());

        assert!(!state.apply_greeting(&first, Ok("old".to_string())));
        assert_eq!(state.greeting(), DEFAULT_GREETING);
        assert!(state.apply_greeting(&second, Ok("new".to_string())));
    }

    #[test]
    fn greeting_after_sign_out_is_ignored() {
        let mut state = AppState::new();
        let ticket = state.sign_in(ada());
        state.sign_out();
        assert!(!state.apply_greeting(&ticket, Ok("late".to_string())));
    }

    #[test]
    fn sign_out_resets_everything() {
        let mut state = AppState::new();
        state.sign_in(ada());
        state.navigate(AppView::Tasks);
        state.tasks_mut().toggle(&TaskId::new("1"));
        state.session_mut().begin_submit("Hi").unwrap();

        state.sign_out();

        assert!(state.identity().is_none());
        assert_eq!(state.view(), AppView::Dashboard);
        assert_eq!(state.tasks(), &TaskList::seeded());
        assert_eq!(state.session().turns().len(), 1);
        assert!(!state.session().is_awaiting());
    }

    #[test]
    fn labels_cover_every_view() {
        let labels = AppView::ALL.map(AppView::label);
        assert_eq!(labels, ["Dashboard", "AI Chat", "Tasks", "Settings"]);
    }
}
