use super::{
    ChatState,
    handler::{
        ClearCommand, DisplayCommand, HelpCommand, InvoicesCommand, ModelCommand, QuitCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::InvoiceChatError;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        state: &mut ChatState,
    ) -> Result<Option<String>, InvoiceChatError> {
        self.registry.execute(command, args, state)
    }

    /// Split a `/name arg…` line and run it. `None` when the line is not a
    /// slash command.
    pub fn execute_line(
        &self,
        line: &str,
        state: &mut ChatState,
    ) -> Option<Result<Option<String>, InvoiceChatError>> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        Some(self.execute(command, &args, state))
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("model", ModelCommand);
    registry.register("display", DisplayCommand);
    registry.register("invoices", InvoicesCommand);

    CommandDispatcher::new(Arc::new(registry))
}
