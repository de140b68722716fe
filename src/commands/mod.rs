pub mod dispatcher;
pub mod handler;
pub mod registry;

use crate::chat::Orchestrator;
pub use dispatcher::{CommandDispatcher, create_command_registry};

pub struct ChatState {
    pub orchestrator: Orchestrator,
    pub should_continue: bool,
}

impl ChatState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            should_continue: true,
        }
    }
}
