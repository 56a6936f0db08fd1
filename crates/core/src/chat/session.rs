use std::time::Duration;

use nexus_llm::{
    CompletionProvider, CompletionRequest, ProviderError, ProviderResult, complete_with_timeout,
};
use snafu::{Snafu, ensure};

use super::message::{Role, Transcript, Turn, TurnId};

/// Assistant text appended when a completion fails for any reason.
pub const COMPLETION_ERROR_TEXT: &str = "Something went wrong. Please check your API key.";
/// Assistant text appended when the provider answers with nothing.
pub const EMPTY_RESPONSE_TEXT: &str = "I'm sorry, I couldn't process that.";

/// Identifier for one submit/response round trip.
///
/// A new id is issued on every accepted submit so late results can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

impl SubmissionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Awaiting(SubmissionId),
}

/// Work handed to the caller after a submit is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub id: SubmissionId,
    pub user_turn: TurnId,
    pub request: CompletionRequest,
}

/// Why a submit or resolve left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("message is empty on `{stage}`"))]
    EmptyInput { stage: &'static str },

    #[snafu(display("submission {pending} is still awaiting a response on `{stage}`"))]
    AwaitingResponse {
        stage: &'static str,
        pending: SubmissionId,
    },

    #[snafu(display("no submission is awaiting a response on `{stage}`"))]
    NoPendingSubmission { stage: &'static str },

    #[snafu(display("submission {attempted} does not match pending {pending} on `{stage}`"))]
    SubmissionMismatch {
        stage: &'static str,
        pending: SubmissionId,
        attempted: SubmissionId,
    },
}

impl SessionError {
    /// Stale results after a reset; expected and not worth surfacing.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::NoPendingSubmission { .. } | Self::SubmissionMismatch { .. }
        )
    }
}

/// Owns one chat surface: the transcript plus the awaiting flag.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Transcript,
    state: SessionState,
    next_turn_id: u64,
    next_submission_id: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::seeded(TurnId::new(1)),
            state: SessionState::Idle,
            next_turn_id: 2,
            next_submission_id: 1,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, SessionState::Awaiting(_))
    }

    /// Starts a round trip.
    ///
    /// The request history is the transcript as it was before the user turn is
    /// appended; the raw text becomes the prompt and the new user turn.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingSubmission, SessionError> {
        if let SessionState::Awaiting(pending) = self.state {
            tracing::debug!(pending = pending.0, "submit ignored while awaiting a response");
            return AwaitingResponseSnafu {
                stage: "begin-submit",
                pending,
            }
            .fail();
        }

        ensure!(
            !text.trim().is_empty(),
            EmptyInputSnafu {
                stage: "begin-submit"
            }
        );

        let history = self.transcript.history();
        let user_turn = self.alloc_turn_id();
        self.transcript.append(user_turn, Role::User, text);

        let id = SubmissionId::new(self.next_submission_id);
        self.next_submission_id = self.next_submission_id.saturating_add(1);
        self.state = SessionState::Awaiting(id);

        Ok(PendingSubmission {
            id,
            user_turn,
            request: CompletionRequest::new(text, history),
        })
    }

    /// Finishes the outstanding round trip with exactly one assistant turn.
    pub fn resolve(
        &mut self,
        id: SubmissionId,
        outcome: ProviderResult<String>,
    ) -> Result<&Turn, SessionError> {
        let pending = match self.state {
            SessionState::Awaiting(pending) => pending,
            SessionState::Idle => {
                return NoPendingSubmissionSnafu { stage: "resolve" }.fail();
            }
        };

        if pending != id {
            tracing::warn!(
                pending = pending.0,
                attempted = id.0,
                "discarding completion for a stale submission"
            );
            return SubmissionMismatchSnafu {
                stage: "resolve",
                pending,
                attempted: id,
            }
            .fail();
        }

        let text = match outcome {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!(submission = id.0, "provider returned an empty completion");
                EMPTY_RESPONSE_TEXT.to_string()
            }
            Ok(text) => text,
            Err(error) => {
                log_completion_failure(id, &error);
                COMPLETION_ERROR_TEXT.to_string()
            }
        };

        self.state = SessionState::Idle;
        let turn_id = self.alloc_turn_id();
        Ok(self.transcript.append(turn_id, Role::Assistant, text))
    }

    /// Runs begin → provider → resolve for callers that can hold the session across the await.
    pub async fn submit(
        &mut self,
        provider: &dyn CompletionProvider,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<&Turn, SessionError> {
        let pending = self.begin_submit(text)?;
        let outcome = complete_with_timeout(provider, pending.request, timeout).await;
        self.resolve(pending.id, outcome)
    }

    /// Drops the conversation back to the greeting. Id counters keep running so
    /// results from before the reset can never resolve the new session.
    pub fn reset(&mut self) {
        let greeting = self.alloc_turn_id();
        self.transcript = Transcript::seeded(greeting);
        self.state = SessionState::Idle;
    }

    fn alloc_turn_id(&mut self) -> TurnId {
        let id = TurnId::new(self.next_turn_id);
        self.next_turn_id = self.next_turn_id.saturating_add(1);
        id
    }
}

fn log_completion_failure(id: SubmissionId, error: &ProviderError) {
    if error.is_configuration() {
        tracing::warn!(
            submission = id.0,
            error = %error,
            "completion skipped: provider not configured"
        );
    } else {
        tracing::error!(submission = id.0, error = %error, "completion failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::GREETING_TEXT;
    use nexus_llm::{ProviderMessage, Role as ProviderRole};

    fn missing_key() -> ProviderError {
        ProviderError::MissingApiKey {
            stage: "test",
            provider_id: "gemini".to_string(),
        }
    }

    fn texts(session: &ChatSession) -> Vec<(Role, &str)> {
        session
            .turns()
            .iter()
            .map(|turn| (turn.role, turn.text.as_str()))
            .collect()
    }

    #[test]
    fn blank_input_is_rejected_without_side_effects() {
        let mut session = ChatSession::new();

        for input in ["", "   ", "\n\t "] {
            assert!(matches!(
                session.begin_submit(input),
                Err(SessionError::EmptyInput { .. })
            ));
        }

        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn accepted_submit_appends_user_turn_and_awaits() {
        let mut session = ChatSession::new();
        let pending = session.begin_submit("  Hi  ").unwrap();

        assert_eq!(session.state(), SessionState::Awaiting(pending.id));
        assert_eq!(session.turns().len(), 2);
        // Raw text is kept for both the turn and the prompt.
        assert_eq!(session.turns()[1].text, "  Hi  ");
        assert_eq!(session.turns()[1].id, pending.user_turn);
        assert_eq!(pending.request.prompt, "  Hi  ");
        assert_eq!(
            pending.request.history,
            vec![ProviderMessage::new(ProviderRole::Assistant, GREETING_TEXT)]
        );
    }

    #[test]
    fn second_submit_while_awaiting_is_a_no_op() {
        let mut session = ChatSession::new();
        let first = session.begin_submit("one").unwrap();
        let before = session.transcript().clone();

        assert_eq!(
            session.begin_submit("two"),
            Err(SessionError::AwaitingResponse {
                stage: "begin-submit",
                pending: first.id,
            })
        );
        assert_eq!(session.transcript(), &before);
        assert_eq!(session.state(), SessionState::Awaiting(first.id));
    }

    #[test]
    fn success_appends_response_and_returns_to_idle() {
        let mut session = ChatSession::new();
        let pending = session.begin_submit("Hi").unwrap();
        let turn = session
            .resolve(pending.id, Ok("Hello human.".to_string()))
            .unwrap();

        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.text, "Hello human.");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            texts(&session),
            vec![
                (Role::Assistant, GREETING_TEXT),
                (Role::User, "Hi"),
                (Role::Assistant, "Hello human."),
            ]
        );
    }

    #[test]
    fn failure_appends_fixed_error_text() {
        let mut session = ChatSession::new();
        let pending = session.begin_submit("Hi").unwrap();
        let turn = session.resolve(pending.id, Err(missing_key())).unwrap();

        assert_eq!(turn.text, COMPLETION_ERROR_TEXT);
        assert_eq!(session.turns().len(), 3);
        assert!(!session.is_awaiting());
    }

    #[test]
    fn blank_response_uses_fallback_text() {
        let mut session = ChatSession::new();
        let pending = session.begin_submit("Hi").unwrap();
        let turn = session.resolve(pending.id, Ok("  \n".to_string())).unwrap();
        assert_eq!(turn.text, EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn resolve_without_pending_submission_is_rejected() {
        let mut session = ChatSession::new();
        assert_eq!(
            session
                .resolve(SubmissionId::new(1), Ok("late".to_string()))
                .map(|turn| turn.id),
            Err(SessionError::NoPendingSubmission { stage: "resolve" })
        );
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn stale_result_after_reset_is_discarded() {
        let mut session = ChatSession::new();
        let stale = session.begin_submit("before reset").unwrap();
        session.reset();
        let current = session.begin_submit("after reset").unwrap();

        assert_ne!(stale.id, current.id);
        assert!(matches!(
            session.resolve(stale.id, Ok("old".to_string())),
            Err(SessionError::SubmissionMismatch { .. })
        ));
        assert!(session.is_awaiting());

        session.resolve(current.id, Ok("new".to_string())).unwrap();
        assert_eq!(session.turns().last().unwrap().text, "new");
    }

    #[test]
    fn rejections_describe_the_submission_and_stage() {
        let mut session = ChatSession::new();
        let first = session.begin_submit("one").unwrap();

        let busy = session.begin_submit("two").unwrap_err();
        assert_eq!(
            busy.to_string(),
            "submission #1 is still awaiting a response on `begin-submit`"
        );
        assert_eq!(first.id, SubmissionId::new(1));
        assert!(!busy.is_stale());

        session.reset();
        let late = session
            .resolve(first.id, Ok("late".to_string()))
            .map(|turn| turn.id)
            .unwrap_err();
        assert!(late.is_stale());
        assert_eq!(
            late.to_string(),
            "no submission is awaiting a response on `resolve`"
        );
    }

    #[test]
    fn reset_keeps_turn_ids_increasing() {
        let mut session = ChatSession::new();
        let pending = session.begin_submit("Hi").unwrap();
        session.resolve(pending.id, Ok("Hey".to_string())).unwrap();
        let highest = session.turns().last().unwrap().id;

        session.reset();

        assert_eq!(session.turns().len(), 1);
        assert!(session.turns()[0].id > highest);
        assert_eq!(session.turns()[0].text, GREETING_TEXT);
    }

    #[test]
    fn roles_alternate_over_many_round_trips() {
        let mut session = ChatSession::new();
        for round in 0..20 {
            let pending = session.begin_submit(&format!("question {round}")).unwrap();
            let outcome = if round % 3 == 0 {
                Err(missing_key())
            } else {
                Ok(format!("answer {round}"))
            };
            session.resolve(pending.id, outcome).unwrap();
        }

        let turns = session.turns();
        assert_eq!(turns.len(), 41);
        assert!(turns.windows(2).all(|pair| pair[0].role != pair[1].role));
        assert!(
            turns
                .windows(2)
                .all(|pair| pair[0].created_at <= pair[1].created_at)
        );
    }
}
