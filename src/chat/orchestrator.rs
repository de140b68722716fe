use super::history;
use super::message::Message;
use super::prompt::{self, Notices};
use super::session::Session;
use crate::core::error::InvoiceChatError;
use crate::operations::{Dispatcher, OperationResult};
use crate::providers::gemini::types::{
    Content, FunctionCall, FunctionResponse, GenerationConfig, Part, Role, Tool,
};
use crate::relay::{GenerateRequest, RelayClient, RequestConfig};
use std::sync::Arc;

pub const DEFAULT_MAX_FUNCTION_ROUNDS: usize = 8;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    /// Dispatch rounds allowed per request before the loop is aborted.
    pub max_function_rounds: usize,
    pub language: String,
    pub generation: GenerationConfig,
    pub notices: Notices,
}

impl OrchestratorSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_function_rounds: DEFAULT_MAX_FUNCTION_ROUNDS,
            language: "English".to_string(),
            generation: GenerationConfig::default(),
            notices: Notices::default(),
        }
    }
}

/// Receives operation activity as it happens, for display.
pub trait ActivityObserver: Send + Sync {
    fn on_call(&self, call: &FunctionCall);
    fn on_result(&self, call: &FunctionCall, result: &OperationResult);
}

/// Drives one session: user text in, exactly one assistant message out,
/// with any number of model-requested operations in between.
pub struct Orchestrator {
    relay: Arc<dyn RelayClient>,
    dispatcher: Dispatcher,
    settings: OrchestratorSettings,
    session: Session,
    observer: Option<Box<dyn ActivityObserver>>,
}

impl Orchestrator {
    pub fn new(
        relay: Arc<dyn RelayClient>,
        dispatcher: Dispatcher,
        settings: OrchestratorSettings,
    ) -> Self {
        let mut session = Session::new();
        session.push(Message::greeting(settings.notices.greeting.clone()));
        Self {
            relay,
            dispatcher,
            settings,
            session,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn ActivityObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.settings.model = model.to_string();
    }

    /// Start over with a fresh conversation. A disabled session stays disabled.
    pub fn clear(&mut self) {
        let disabled = self.session.is_disabled();
        self.session = Session::new();
        self.session
            .push(Message::greeting(self.settings.notices.greeting.clone()));
        if disabled {
            self.session.disable();
        }
    }

    /// Ping the relay. A missing credential disables the session for good.
    pub async fn connect(&mut self) -> Result<(), InvoiceChatError> {
        match self.relay.ping().await {
            Ok(()) => {
                tracing::debug!("relay ping succeeded");
                Ok(())
            }
            Err(e) if e.is_config() => {
                tracing::error!(error = %e, "relay is not configured");
                self.disable_with_notice();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "relay ping failed");
                self.session
                    .push(Message::notice(self.settings.notices.unreachable.clone()));
                Err(e)
            }
        }
    }

    /// Handle one user request and return the assistant message it produced.
    ///
    /// Errors are only returned when the input is refused (empty, busy,
    /// disabled); every failure after that ends as an assistant message.
    pub async fn send(&mut self, text: &str) -> Result<&Message, InvoiceChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InvoiceChatError::Input("message is empty".to_string()));
        }
        if self.session.is_disabled() {
            return Err(InvoiceChatError::Input(
                "the session is disabled until the service is configured".to_string(),
            ));
        }
        let Some(_busy) = self.session.busy_flag().try_acquire() else {
            return Err(InvoiceChatError::Input(
                "a request is already in progress".to_string(),
            ));
        };

        self.session.push(Message::user(text));
        let turns = history::to_turns(self.session.messages());

        let outcome = self.run_turns(turns).await;
        let reply = match outcome {
            Ok(text) => Message::assistant(text),
            Err(e) if e.is_config() => {
                tracing::error!(error = %e, "relay is not configured");
                return Ok(self.disable_with_notice());
            }
            Err(e) => {
                tracing::warn!(error = %e, "request failed");
                Message::failure(format!(
                    "{} {}",
                    self.settings.notices.failure_prefix,
                    user_facing(&e)
                ))
            }
        };

        Ok(self.session.push(reply))
    }

    fn disable_with_notice(&mut self) -> &Message {
        self.session.disable();
        self.session
            .push(Message::notice(self.settings.notices.unavailable.clone()))
    }

    /// The Sending → Inspecting → Dispatching loop. Returns the final text.
    async fn run_turns(&self, mut turns: Vec<Content>) -> Result<String, InvoiceChatError> {
        let tool = self.dispatcher.registry().tool();
        let instruction =
            prompt::system_instruction(self.dispatcher.today(), &self.settings.language);
        let mut rounds = 0usize;

        loop {
            let request = self.build_request(&turns, &instruction, &tool)?;
            tracing::debug!(round = rounds, turns = turns.len(), "sending to relay");
            let reply = self.relay.generate(&request).await?;

            if !reply.has_function_calls() {
                return Ok(reply
                    .text
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| self.settings.notices.empty_reply.clone()));
            }

            if rounds >= self.settings.max_function_rounds {
                tracing::warn!(rounds, "function-call loop cap reached");
                return Err(InvoiceChatError::Api(
                    self.settings.notices.too_many_calls.clone(),
                ));
            }
            rounds += 1;

            turns.push(Content::new(Role::Model, reply.parts));
            let responses = reply
                .function_calls
                .iter()
                .map(|call| Part::function_response(self.dispatch(call)))
                .collect();
            turns.push(Content::new(Role::User, responses));
        }
    }

    fn dispatch(&self, call: &FunctionCall) -> FunctionResponse {
        if let Some(observer) = &self.observer {
            observer.on_call(call);
        }
        let result = self.dispatcher.execute(&call.name, &call.args);
        tracing::debug!(
            operation = %call.name,
            failed = result.is_failure(),
            "operation dispatched"
        );
        if let Some(observer) = &self.observer {
            observer.on_result(call, &result);
        }

        FunctionResponse {
            name: call.name.clone(),
            response: result.into_response(),
            id: call.id.clone(),
        }
    }

    fn build_request(
        &self,
        turns: &[Content],
        instruction: &str,
        tool: &Tool,
    ) -> Result<GenerateRequest, InvoiceChatError> {
        let config = RequestConfig::new(instruction, &self.settings.generation)?;
        GenerateRequest::new(&self.settings.model, turns.to_vec(), config, tool)
    }
}

/// Strip the error-kind prefix from relay/provider errors; the user only needs
/// the description.
fn user_facing(err: &InvoiceChatError) -> String {
    match err {
        InvoiceChatError::Api(m)
        | InvoiceChatError::Relay(m)
        | InvoiceChatError::Network(m)
        | InvoiceChatError::Serialization(m) => m.clone(),
        other => other.to_string(),
    }
}
