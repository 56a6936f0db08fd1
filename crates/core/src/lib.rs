//! Application state for Nexus, independent of any UI toolkit.

pub mod app_state;
pub mod chat;
pub mod identity;
pub mod settings;
pub mod tasks;

pub use app_state::{AppState, AppView, DEFAULT_GREETING, GreetingTicket};
pub use identity::{Identity, IdentityError, decode_id_token};
pub use settings::{AppSettings, ConfigIssue, SettingsError, SettingsStore, ThemePreference};
pub use tasks::{Task, TaskCategory, TaskId, TaskList};
