use crate::chat::{MessageKind, Orchestrator, OrchestratorSettings};
use crate::cli::SessionArgs;
use crate::commands::{ChatState, CommandDispatcher};
use crate::config::Config;
use crate::core::error::InvoiceChatError;
use crate::display::{self, TerminalObserver};
use crate::input;
use crate::operations::Dispatcher;
use crate::providers::gemini::types::GenerationConfig;
use crate::relay::HttpRelayClient;
use crate::store::{InvoiceStore, JsonFileStore, MemoryStore};
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::sync::Arc;

pub struct Application {
    pub config: Config,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(config: Config, command_dispatcher: CommandDispatcher) -> Self {
        display::set_display_mode(config.display_mode);
        Self {
            config,
            command_dispatcher,
        }
    }

    fn open_store(&self, session: &SessionArgs) -> Result<Arc<dyn InvoiceStore>, InvoiceChatError> {
        if session.ephemeral {
            tracing::info!("using an in-memory invoice store");
            return Ok(Arc::new(MemoryStore::new()));
        }
        let path = self.config.store_path();
        tracing::info!(path = %path.display(), "opening invoice store");
        Ok(Arc::new(JsonFileStore::open(path)?))
    }

    fn settings(&self, session: &SessionArgs) -> OrchestratorSettings {
        let chat = &self.config.chat;
        let mut settings =
            OrchestratorSettings::new(session.model.clone().unwrap_or_else(|| chat.model.clone()));
        settings.max_function_rounds = chat.max_function_rounds;
        settings.language = chat.language.clone();
        settings.generation = GenerationConfig {
            temperature: chat.temperature,
            ..GenerationConfig::default()
        };
        settings
    }

    pub fn build_orchestrator(
        &self,
        session: &SessionArgs,
    ) -> Result<Orchestrator, InvoiceChatError> {
        let relay_url = session
            .relay_url
            .clone()
            .unwrap_or_else(|| self.config.chat.relay_url.clone());
        let relay = HttpRelayClient::new(relay_url, self.config.chat.request_timeout())?;
        let dispatcher = Dispatcher::new(self.open_store(session)?);

        Ok(
            Orchestrator::new(Arc::new(relay), dispatcher, self.settings(session))
                .with_observer(Box::new(TerminalObserver)),
        )
    }

    pub async fn run_chat(&self, session: &SessionArgs) -> Result<(), InvoiceChatError> {
        let mut orchestrator = self.build_orchestrator(session)?;
        if let Some(greeting) = orchestrator.session().last() {
            display::display_message(greeting);
        }
        if orchestrator.connect().await.is_err() {
            if let Some(notice) = orchestrator.session().last() {
                display::display_message(notice);
            }
        }

        display::display_info(
            "Type '/help' for available commands. Press Ctrl+D or type /quit to exit.",
        );

        let mut state = ChatState::new(orchestrator);
        let mut editor = input::create_editor(&self.command_dispatcher)?;

        while state.should_continue {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(outcome) = self.command_dispatcher.execute_line(line, &mut state) {
                match outcome {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => display::display_error(&e.to_string()),
                }
                continue;
            }

            match state.orchestrator.send(line).await {
                Ok(reply) => display::display_message(reply),
                Err(e) => display::display_error(&e.to_string()),
            }
        }

        input::save_history(&mut editor)?;
        Ok(())
    }

    /// One request, one answer. Returns whether the assistant answered normally.
    pub async fn run_ask(
        &self,
        session: &SessionArgs,
        query: &str,
    ) -> Result<bool, InvoiceChatError> {
        let context = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| InvoiceChatError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        let mut orchestrator = self.build_orchestrator(session)?;
        if let Err(e) = orchestrator.connect().await {
            if e.is_config() {
                if let Some(notice) = orchestrator.session().last() {
                    display::display_message(notice);
                }
                return Ok(false);
            }
        }

        let reply = orchestrator.send(&compose_query(query, context.as_deref())).await?;
        display::display_message(reply);
        Ok(reply.kind == MessageKind::Conversation)
    }
}

/// Piped input rides along as context after the question.
fn compose_query(query: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("{}\n\n<context>\n{}\n</context>", query.trim(), context),
        None => query.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;

    #[test]
    fn piped_context_is_appended() {
        assert_eq!(compose_query(" list invoices ", None), "list invoices");
        assert_eq!(compose_query("list invoices", Some("  \n")), "list invoices");
        assert_eq!(
            compose_query("summarise", Some("INV-1 Alice\n")),
            "summarise\n\n<context>\nINV-1 Alice\n</context>"
        );
    }

    #[test]
    fn session_flags_override_the_config() {
        let mut config = Config::default();
        config.chat.temperature = Some(0.5);
        config.chat.max_function_rounds = 3;
        let app = Application::new(config, create_command_registry());

        let settings = app.settings(&SessionArgs {
            model: Some("gemini-2.5-pro".to_string()),
            ..SessionArgs::default()
        });
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.max_function_rounds, 3);
        assert_eq!(settings.generation.temperature, Some(0.5));

        let defaults = app.settings(&SessionArgs::default());
        assert_eq!(defaults.model, "gemini-2.5-flash");
    }

    #[test]
    fn ephemeral_sessions_use_memory() {
        let app = Application::new(Config::default(), create_command_registry());
        let store = app
            .open_store(&SessionArgs {
                ephemeral: true,
                ..SessionArgs::default()
            })
            .unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
