use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nexus_core::chat::{
    COMPLETION_ERROR_TEXT, ChatSession, GREETING_TEXT, Role, SessionError, SessionState,
};
use nexus_core::{AppState, AppView, DEFAULT_GREETING, Identity, TaskId};
use nexus_llm::{
    BoxFuture, CompletionProvider, CompletionRequest, DEFAULT_GEMINI_MODEL, ProviderError,
    ProviderResult, Role as ProviderRole,
};

/// Replays canned outcomes in order and records every request it sees.
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    hang: bool,
}

impl ScriptedProvider {
    fn replying(replies: Vec<ProviderResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn default_model(&self) -> &str {
        DEFAULT_GEMINI_MODEL
    }

    fn complete<'a>(&'a self, request: CompletionRequest) -> BoxFuture<'a, ProviderResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if self.hang {
            return Box::pin(futures::future::pending());
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()));
        Box::pin(async move { reply })
    }

    fn greet<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move { Ok(format!("Good morning, {name}.")) })
    }
}

fn network_failure() -> ProviderError {
    ProviderError::Interrupted {
        stage: "test",
        details: "connection reset".to_string(),
    }
}

fn grace() -> Identity {
    Identity {
        subject: "42".to_string(),
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        picture: String::new(),
    }
}

fn transcript(session: &ChatSession) -> Vec<(Role, String)> {
    session
        .turns()
        .iter()
        .map(|turn| (turn.role, turn.text.clone()))
        .collect()
}

#[tokio::test]
async fn successful_round_trip_appends_the_reply() {
    let provider = ScriptedProvider::replying(vec![Ok("Hello human.".to_string())]);
    let mut session = ChatSession::new();

    let turn = session.submit(&provider, "Hi", None).await.unwrap();
    assert_eq!(turn.text, "Hello human.");

    assert_eq!(
        transcript(&session),
        vec![
            (Role::Assistant, GREETING_TEXT.to_string()),
            (Role::User, "Hi".to_string()),
            (Role::Assistant, "Hello human.".to_string()),
        ]
    );
    assert_eq!(session.state(), SessionState::Idle);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "Hi");
    assert_eq!(requests[0].history.len(), 1);
    assert_eq!(requests[0].history[0].role, ProviderRole::Assistant);
}

#[tokio::test]
async fn failed_round_trip_appends_the_error_text() {
    let provider = ScriptedProvider::replying(vec![Err(network_failure())]);
    let mut session = ChatSession::new();

    session.submit(&provider, "Hi", None).await.unwrap();

    assert_eq!(
        transcript(&session),
        vec![
            (Role::Assistant, GREETING_TEXT.to_string()),
            (Role::User, "Hi".to_string()),
            (Role::Assistant, COMPLETION_ERROR_TEXT.to_string()),
        ]
    );
    assert!(!session.is_awaiting());
}

#[tokio::test]
async fn blank_input_never_reaches_the_provider() {
    let provider = ScriptedProvider::default();
    let mut session = ChatSession::new();

    let result = session.submit(&provider, "   ", None).await;

    assert!(matches!(result, Err(SessionError::EmptyInput { .. })));
    assert_eq!(provider.calls(), 0);
    assert_eq!(session.turns().len(), 1);
}

#[tokio::test]
async fn submit_while_awaiting_makes_no_second_call() {
    let provider = ScriptedProvider::replying(vec![Ok("first answer".to_string())]);
    let mut session = ChatSession::new();

    let pending = session.begin_submit("first").unwrap();
    let before = session.transcript().clone();

    let second = session.submit(&provider, "second", None).await;
    assert!(matches!(second, Err(SessionError::AwaitingResponse { .. })));
    assert_eq!(session.transcript(), &before);
    assert_eq!(provider.calls(), 0);

    let outcome = provider.complete(pending.request).await;
    session.resolve(pending.id, outcome).unwrap();
    assert_eq!(provider.calls(), 1);
    assert_eq!(session.turns().len(), 3);
}

#[tokio::test]
async fn history_grows_with_each_round_trip() {
    let provider = ScriptedProvider::replying(vec![
        Ok("one".to_string()),
        Err(network_failure()),
        Ok("three".to_string()),
    ]);
    let mut session = ChatSession::new();

    for prompt in ["a", "b", "c"] {
        session.submit(&provider, prompt, None).await.unwrap();
    }

    let history_sizes = provider
        .requests()
        .iter()
        .map(|request| request.history.len())
        .collect::<Vec<_>>();
    assert_eq!(history_sizes, vec![1, 3, 5]);
    assert_eq!(session.turns().len(), 7);
    assert!(
        session
            .turns()
            .windows(2)
            .all(|pair| pair[0].role != pair[1].role)
    );
}

#[tokio::test(start_paused = true)]
async fn hung_completion_times_out_back_to_idle() {
    let provider = ScriptedProvider::hanging();
    let mut session = ChatSession::new();

    let turn = session
        .submit(&provider, "Hi", Some(Duration::from_secs(60)))
        .await
        .unwrap();

    assert_eq!(turn.text, COMPLETION_ERROR_TEXT);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn sign_in_greets_and_sign_out_resets() {
    let provider = ScriptedProvider::replying(vec![Ok("Sure.".to_string())]);
    let mut state = AppState::new();

    let ticket = state.sign_in(grace());
    let greeting = provider.greet(ticket.name()).await;
    assert!(state.apply_greeting(&ticket, greeting));
    assert_eq!(state.greeting(), "Good morning, Grace Hopper.");

    state.navigate(AppView::Chat);
    state
        .session_mut()
        .submit(&provider, "Plan my day", None)
        .await
        .unwrap();
    state.navigate(AppView::Settings);
    assert!(state.tasks_mut().toggle(&TaskId::new("1")));
    assert_eq!(state.pending_task_count(), 1);

    state.sign_out();

    assert!(state.identity().is_none());
    assert_eq!(state.view(), AppView::Dashboard);
    assert_eq!(state.greeting(), DEFAULT_GREETING);
    assert_eq!(state.session().turns().len(), 1);
    assert_eq!(state.pending_task_count(), 2);
}

#[tokio::test]
async fn greeting_from_a_previous_sign_in_is_dropped() {
    let provider = ScriptedProvider::default();
    let mut state = AppState::new();

    let stale = state.sign_in(grace());
    state.sign_out();
    let current = state.sign_in(grace());

    let late = provider.greet(stale.name()).await;
    assert!(!state.apply_greeting(&stale, late));
    assert_eq!(state.greeting(), DEFAULT_GREETING);

    let fresh = provider.greet(current.name()).await;
    assert!(state.apply_greeting(&current, fresh));
}

#[test]
fn toggling_one_task_leaves_the_rest_untouched() {
    let mut state = AppState::new();
    let before = state.tasks().clone();

    state.tasks_mut().toggle(&TaskId::new("1"));

    for (after, original) in state.tasks().iter().zip(before.iter()) {
        if after.id == TaskId::new("1") {
            assert!(after.completed && !original.completed);
        } else {
            assert_eq!(after, original);
        }
    }
}
