//! Orchestrator behaviour against a scripted relay and an in-memory store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

use invoicechat::chat::{MessageKind, MessageRole, Orchestrator, OrchestratorSettings};
use invoicechat::core::InvoiceChatError;
use invoicechat::operations::Dispatcher;
use invoicechat::providers::gemini::types::{FunctionCall, Part, Role};
use invoicechat::relay::{GenerateRequest, RelayClient, RelayReply};
use invoicechat::store::{InvoiceStatus, InvoiceStore, MemoryStore};

// =============================================================================
// Helpers
// =============================================================================

/// Relay that answers from a queue and records every request it receives.
#[derive(Default)]
struct ScriptedRelay {
    replies: Mutex<VecDeque<Result<RelayReply, InvoiceChatError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    ping_config_error: bool,
}

impl ScriptedRelay {
    fn with_replies(replies: Vec<Result<RelayReply, InvoiceChatError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayClient for ScriptedRelay {
    async fn ping(&self) -> Result<(), InvoiceChatError> {
        if self.ping_config_error {
            Err(InvoiceChatError::Config("no credential".into()))
        } else {
            Ok(())
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<RelayReply, InvoiceChatError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InvoiceChatError::Relay("script exhausted".into())))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn text_reply(text: &str) -> Result<RelayReply, InvoiceChatError> {
    Ok(RelayReply {
        text: Some(text.to_string()),
        function_calls: Vec::new(),
        parts: vec![Part::text(text)],
    })
}

fn call(name: &str, args: Value) -> FunctionCall {
    FunctionCall {
        name: name.to_string(),
        args: args.as_object().cloned().unwrap_or_else(Map::new),
        id: None,
    }
}

fn calls_reply(calls: Vec<FunctionCall>) -> Result<RelayReply, InvoiceChatError> {
    Ok(RelayReply {
        text: None,
        parts: calls.iter().cloned().map(Part::function_call).collect(),
        function_calls: calls,
    })
}

fn orchestrator(relay: Arc<ScriptedRelay>, store: Arc<MemoryStore>) -> Orchestrator {
    let dispatcher = Dispatcher::new(store).with_today(today);
    Orchestrator::new(relay, dispatcher, OrchestratorSettings::new("gemini-2.5-flash"))
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn creates_an_invoice_end_to_end() {
    let relay = ScriptedRelay::with_replies(vec![
        calls_reply(vec![call(
            "create",
            json!({"clientName": "Alice", "amount": 100, "dueDate": "2099-01-01"}),
        )]),
        text_reply("Invoice for Alice created: $100.00 due 2099-01-01."),
    ]);
    let store = Arc::new(MemoryStore::new());
    let mut chat = orchestrator(relay.clone(), store.clone());

    let reply = chat
        .send("create invoice for Alice, $100, due 2099-01-01")
        .await
        .unwrap();
    assert_eq!(reply.role, MessageRole::Assistant);
    assert_eq!(reply.kind, MessageKind::Conversation);
    assert!(reply.text.contains("Alice"));

    let records = store.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].client_name, "Alice");
    assert_eq!(records[0].status, InvoiceStatus::Pending);
    assert_eq!(records[0].issue_date, today());

    let requests = relay.requests();
    assert_eq!(requests.len(), 2);
    // First request: just the user's message, with the tool schema attached.
    assert_eq!(requests[0].contents.len(), 1);
    let tools = requests[0].tools.as_ref().unwrap();
    assert_eq!(tools[0]["functionDeclarations"].as_array().unwrap().len(), 5);
    assert!(
        requests[0]
            .config
            .as_ref()
            .and_then(|c| c.instruction_text())
            .unwrap()
            .contains("2026-10-19")
    );
    // Second request: user turn, model call turn, function response turn.
    let follow_up = &requests[1].contents;
    assert_eq!(follow_up.len(), 3);
    assert_eq!(follow_up[1].role, Some(Role::Model));
    assert_eq!(follow_up[2].role, Some(Role::User));
    let response = follow_up[2].parts[0].as_function_response().unwrap();
    assert_eq!(response.name, "create");
    assert_eq!(response.response["success"], true);
    assert_eq!(response.response["clientName"], "Alice");

    // Greeting, user message, assistant reply: one visible answer per request.
    let messages = chat.session().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].kind, MessageKind::Greeting);
}

#[tokio::test]
async fn every_call_in_a_reply_gets_one_response_in_a_single_turn() {
    let relay = ScriptedRelay::with_replies(vec![
        calls_reply(vec![
            call("list", json!({})),
            call("read", json!({"id": "INV-404"})),
            call("archive", json!({"id": "INV-1"})),
        ]),
        text_reply("Here is what I found."),
    ]);
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    chat.send("show me everything").await.unwrap();

    let requests = relay.requests();
    assert_eq!(requests.len(), 2);
    let contents = &requests[1].contents;
    assert_eq!(contents.len(), 3);

    let responses: Vec<_> = contents[2]
        .parts
        .iter()
        .map(|p| p.as_function_response().unwrap())
        .collect();
    let names: Vec<&str> = responses.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["list", "read", "archive"]);
    assert!(responses[0].response["message"].is_string());
    assert!(responses[1].response["error"].as_str().unwrap().contains("not found"));
    assert_eq!(
        responses[2].response,
        json!({"error": "unknown operation archive"})
    );
}

#[tokio::test]
async fn configured_temperature_is_sent_exactly() {
    let relay = ScriptedRelay::with_replies(vec![text_reply("Nothing to do.")]);
    let dispatcher = Dispatcher::new(Arc::new(MemoryStore::new())).with_today(today);
    let mut settings = OrchestratorSettings::new("gemini-2.5-flash");
    settings.generation.temperature = Some(0.2);
    let mut chat = Orchestrator::new(relay.clone(), dispatcher, settings);

    chat.send("hello").await.unwrap();

    let config = serde_json::to_value(relay.requests()[0].config.as_ref().unwrap()).unwrap();
    assert_eq!(config["temperature"], json!(0.2));
    assert!(config.get("topP").is_none());
}

#[tokio::test]
async fn raw_reply_parts_are_replayed_unchanged() {
    let signed: Part = serde_json::from_value(json!({
        "functionCall": {"name": "list", "args": {}},
        "thoughtSignature": "opaque-signature"
    }))
    .unwrap();
    let relay = ScriptedRelay::with_replies(vec![
        Ok(RelayReply {
            text: None,
            function_calls: vec![call("list", json!({}))],
            parts: vec![signed.clone()],
        }),
        text_reply("No invoices yet."),
    ]);
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    chat.send("list invoices").await.unwrap();

    assert_eq!(relay.requests()[1].contents[1].parts, vec![signed]);
}

#[tokio::test]
async fn endless_function_calls_are_capped() {
    let replies = (0..20)
        .map(|_| calls_reply(vec![call("list", json!({}))]))
        .collect();
    let relay = ScriptedRelay::with_replies(replies);
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    let reply = chat.send("loop forever").await.unwrap();
    assert_eq!(reply.kind, MessageKind::Failure);
    assert!(reply.text.contains("stopped"));

    // Eight dispatch rounds, then the ninth reply with calls aborts.
    assert_eq!(relay.requests().len(), 9);
    assert!(chat.session().accepts_input());
}

#[tokio::test]
async fn relay_errors_are_surfaced_and_the_session_stays_usable() {
    let relay = ScriptedRelay::with_replies(vec![
        Err(InvoiceChatError::Relay("RESOURCE_EXHAUSTED: quota exceeded".into())),
        text_reply("You have no invoices."),
    ]);
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    let failed = chat.send("list my invoices").await.unwrap();
    assert_eq!(failed.kind, MessageKind::Failure);
    assert!(failed.text.contains("quota exceeded"));
    assert!(chat.session().accepts_input());

    let retried = chat.send("list my invoices").await.unwrap();
    assert_eq!(retried.text, "You have no invoices.");

    // The failure message is not replayed, but both user messages are.
    let retry_request = &relay.requests()[1];
    assert_eq!(retry_request.contents.len(), 2);
    assert!(
        retry_request
            .contents
            .iter()
            .all(|c| c.role == Some(Role::User))
    );
}

#[tokio::test]
async fn missing_credential_disables_the_session() {
    let relay = Arc::new(ScriptedRelay {
        ping_config_error: true,
        ..Default::default()
    });
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    let err = chat.connect().await.unwrap_err();
    assert!(err.is_config());
    assert!(chat.session().is_disabled());
    assert_eq!(chat.session().last().unwrap().kind, MessageKind::Notice);

    assert!(chat.send("hello").await.is_err());
    assert!(relay.requests().is_empty());
}

#[tokio::test]
async fn config_error_mid_request_ends_with_a_single_notice() {
    let relay = ScriptedRelay::with_replies(vec![Err(InvoiceChatError::Config(
        "no credential".into(),
    ))]);
    let mut chat = orchestrator(relay, Arc::new(MemoryStore::new()));

    let notice = chat.send("hello").await.unwrap();
    assert_eq!(notice.kind, MessageKind::Notice);

    let messages = chat.session().messages();
    assert_eq!(messages.len(), 3);
    assert!(chat.session().is_disabled());
    assert!(!chat.session().is_busy());
}

#[tokio::test]
async fn empty_final_text_falls_back_to_a_fixed_sentence() {
    let relay = ScriptedRelay::with_replies(vec![Ok(RelayReply::default())]);
    let mut chat = orchestrator(relay, Arc::new(MemoryStore::new()));

    let reply = chat.send("thanks").await.unwrap();
    assert_eq!(reply.kind, MessageKind::Conversation);
    assert!(!reply.text.is_empty());
}

#[tokio::test]
async fn blank_input_is_refused_without_a_relay_call() {
    let relay = ScriptedRelay::with_replies(vec![]);
    let mut chat = orchestrator(relay.clone(), Arc::new(MemoryStore::new()));

    assert!(chat.send("   ").await.is_err());
    assert!(relay.requests().is_empty());
    assert_eq!(chat.session().messages().len(), 1);
}
