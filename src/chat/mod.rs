//! Conversation state and the function-calling loop.

pub mod history;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use message::{Message, MessageKind, MessageRole};
pub use orchestrator::{ActivityObserver, Orchestrator, OrchestratorSettings};
pub use prompt::Notices;
pub use session::{BusyFlag, Session};
