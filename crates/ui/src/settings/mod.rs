pub mod state;
pub mod view;

pub use state::{SettingsChanged, SettingsState, apply_theme, theme_mode};
pub use view::SettingsView;
