use super::ChatState;
use crate::core::error::InvoiceChatError;
use crate::display::{self, DisplayMode};

use console::style;

pub trait CommandHandler {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct ModelCommand;
pub struct DisplayCommand;
pub struct InvoicesCommand;

impl CommandHandler for QuitCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            ModelCommand.help().to_string(),
            DisplayCommand.help().to_string(),
            InvoicesCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        state.orchestrator.clear();
        Ok(Some("Started a new conversation.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Start a new conversation"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        match args.first() {
            None => Ok(Some(format!("Current model: {}", state.orchestrator.model()))),
            Some(name) => {
                state.orchestrator.set_model(name);
                Ok(Some(format!("Model changed to: {}", name)))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

impl CommandHandler for DisplayCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        let Some(arg) = args.first() else {
            return Ok(Some(
                "Usage: /display <mode> where mode is: verbose, minimal, hidden, or help"
                    .to_string(),
            ));
        };

        if *arg == "help" {
            display::display_mode_help();
            return Ok(None);
        }

        match DisplayMode::parse(arg) {
            Some(mode) => {
                display::set_display_mode(mode);
                let detail = match mode {
                    DisplayMode::Verbose => "showing operations with arguments and results",
                    DisplayMode::Minimal => "showing operation names",
                    DisplayMode::Hidden => "hiding operation activity",
                };
                Ok(Some(format!("Display mode set to {} - {}", arg, detail)))
            }
            None => Ok(Some(
                "Unknown display mode. Use: verbose, minimal, hidden, or help".to_string(),
            )),
        }
    }

    fn help(&self) -> &'static str {
        "/display <mode> - Control operation visibility (verbose/minimal/hidden/help)"
    }
}

impl CommandHandler for InvoicesCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, InvoiceChatError> {
        let invoices = state.orchestrator.dispatcher().store().list()?;
        Ok(Some(display::invoice_table(&invoices)))
    }

    fn help(&self) -> &'static str {
        "/invoices - Print stored invoices without asking the assistant"
    }
}
