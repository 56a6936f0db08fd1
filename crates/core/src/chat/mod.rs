/// Turn and transcript model.
pub mod message;
/// Submit/resolve state machine for one chat surface.
pub mod session;

pub use message::{GREETING_TEXT, Role, Transcript, Turn, TurnId};
pub use session::{
    COMPLETION_ERROR_TEXT, ChatSession, EMPTY_RESPONSE_TEXT, PendingSubmission, SessionError,
    SessionState, SubmissionId,
};
