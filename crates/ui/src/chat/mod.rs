/// Event contracts between the chat widgets and the shell.
pub mod events;
pub mod message_input;
pub mod message_list;
pub mod view;

pub use events::Submit;
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use view::ChatView;
