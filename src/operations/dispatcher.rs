use super::handler::{self, Operation};
use super::registry::OperationRegistry;
use super::OperationResult;
use crate::store::InvoiceStore;
use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use std::sync::Arc;

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Executes model-requested operations against the invoice store.
///
/// `execute` never fails: unknown names, bad arguments and store errors all
/// come back as `OperationResult::Failure` so the model can explain them.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn InvoiceStore>,
    registry: Arc<OperationRegistry>,
    today: Today,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self {
            store,
            registry: Arc::new(OperationRegistry::new()),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Replace the session-local clock.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn execute(&self, name: &str, args: &Map<String, Value>) -> OperationResult {
        let Some(kind) = self.registry.resolve(name) else {
            tracing::warn!(operation = name, "model requested an unknown operation");
            return OperationResult::Failure(format!("unknown operation {}", name));
        };

        let missing = self.registry.missing_required(kind, args);
        if !missing.is_empty() {
            return OperationResult::Failure(format!(
                "missing required argument(s): {}",
                missing.join(", ")
            ));
        }

        let operation = match kind.parse(args) {
            Ok(operation) => operation,
            Err(message) => return OperationResult::Failure(message),
        };

        let outcome = self.run(operation);
        if let Err(message) = &outcome {
            tracing::debug!(operation = name, error = %message, "operation failed");
        }
        outcome.into()
    }

    fn run(&self, operation: Operation) -> Result<Value, String> {
        let store = self.store.as_ref();
        match operation {
            Operation::Create(new) => {
                let id = new_invoice_id();
                tracing::info!(id = %id, client = %new.client_name, "creating invoice");
                handler::create(store, new, id, self.today())
            }
            Operation::Read { id } => handler::read(store, &id),
            Operation::Update(patch) => {
                tracing::info!(id = %patch.id, "updating invoice");
                handler::update(store, &patch)
            }
            Operation::Delete { id } => {
                tracing::info!(id = %id, "deleting invoice");
                handler::delete(store, &id)
            }
            Operation::List { status } => handler::list(store, status),
        }
    }
}

/// `INV-` plus eight upper-case hex digits.
fn new_invoice_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("INV-{}", simple[..8].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InvoiceStatus, MemoryStore, sample_invoice};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn dispatcher_with(records: Vec<crate::store::Invoice>) -> Dispatcher {
        Dispatcher::new(Arc::new(MemoryStore::with_records(records))).with_today(today)
    }

    fn with_alice(id: &str) -> Dispatcher {
        dispatcher_with(vec![sample_invoice(id, "Alice", InvoiceStatus::Pending)])
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn success(result: OperationResult) -> Value {
        match result {
            OperationResult::Success(value) => value,
            OperationResult::Failure(message) => panic!("expected success, got {}", message),
        }
    }

    fn failure(result: OperationResult) -> String {
        match result {
            OperationResult::Failure(message) => message,
            OperationResult::Success(value) => panic!("expected failure, got {}", value),
        }
    }

    #[test]
    fn create_past_due_is_overdue_and_issued_today() {
        let dispatcher = dispatcher_with(vec![]);
        let echo = success(dispatcher.execute(
            "create",
            &args(json!({"clientName": "Bob", "amount": 40, "dueDate": "2026-10-18"})),
        ));
        assert_eq!(echo["clientName"], "Bob");
        assert_eq!(echo["amount"], 40.0);

        let stored = dispatcher.store().list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, InvoiceStatus::Overdue);
        assert_eq!(stored[0].issue_date, today());
        assert_eq!(stored[0].observations, "");
        assert_eq!(stored[0].id, echo["id"].as_str().unwrap());
    }

    #[test]
    fn create_due_today_or_later_is_pending() {
        let dispatcher = dispatcher_with(vec![]);
        for due in ["2026-10-19", "2026-10-19T00:00:00Z", "2099-01-01"] {
            success(dispatcher.execute(
                "create",
                &args(json!({"clientName": "Alice", "amount": "100", "dueDate": due})),
            ));
        }
        let stored = dispatcher.store().list().unwrap();
        assert!(stored.iter().all(|i| i.status == InvoiceStatus::Pending));
        assert!(stored[0].id.starts_with("INV-"));
    }

    #[test]
    fn create_with_missing_fields_never_touches_the_store() {
        let dispatcher = dispatcher_with(vec![]);
        let message = failure(dispatcher.execute("create", &args(json!({"clientName": "Alice"}))));
        assert_eq!(message, "missing required argument(s): amount, dueDate");

        let message = failure(dispatcher.execute(
            "create",
            &args(json!({"clientName": "Alice", "amount": -5, "dueDate": "2099-01-01"})),
        ));
        assert!(message.contains("non-negative"));
        assert!(dispatcher.store().list().unwrap().is_empty());
    }

    #[test]
    fn read_ignores_id_case() {
        let dispatcher = with_alice("ABC");
        let upper = success(dispatcher.execute("read", &args(json!({"id": "ABC"}))));
        let lower = success(dispatcher.execute("read", &args(json!({"id": "abc"}))));
        assert_eq!(upper, lower);
        assert_eq!(upper["clientName"], "Alice");

        let message = failure(dispatcher.execute("read", &args(json!({"id": "XYZ"}))));
        assert!(message.contains("not found"));
    }

    #[test]
    fn update_merges_fields_and_is_idempotent() {
        let dispatcher = with_alice("INV-1");
        let patch = args(json!({
            "id": "inv-1",
            "status": "paid",
            "observations": "wire transfer"
        }));

        let first = success(dispatcher.execute("update", &patch));
        let after_first = dispatcher.store().list().unwrap();
        let second = success(dispatcher.execute("update", &patch));
        let after_second = dispatcher.store().list().unwrap();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second);
        assert_eq!(after_second[0].status, InvoiceStatus::Paid);
        assert_eq!(after_second[0].observations, "wire transfer");
        assert_eq!(after_second[0].client_name, "Alice");
        assert_eq!(after_second[0].amount, 250.0);
        assert_eq!(after_second[0].id, "INV-1");
    }

    #[test]
    fn update_of_unknown_id_fails_without_creating() {
        let dispatcher = with_alice("INV-1");
        let message = failure(dispatcher.execute(
            "update",
            &args(json!({"id": "INV-9", "amount": 5})),
        ));
        assert!(message.contains("not found"));
        assert_eq!(dispatcher.store().list().unwrap().len(), 1);
    }

    #[test]
    fn update_without_changes_answers_like_an_update() {
        let dispatcher = with_alice("INV-1");
        let before = dispatcher.store().list().unwrap();

        let echo = success(dispatcher.execute("update", &args(json!({"id": "inv-1"}))));
        assert_eq!(echo["success"], true);
        assert_eq!(echo["invoice"]["id"], "INV-1");
        assert_eq!(echo["invoice"]["clientName"], "Alice");
        assert_eq!(dispatcher.store().list().unwrap(), before);

        let message = failure(dispatcher.execute("update", &args(json!({"id": "INV-9"}))));
        assert!(message.contains("not found"));
    }

    #[test]
    fn update_rejects_invalid_status() {
        let dispatcher = with_alice("INV-1");
        let message = failure(dispatcher.execute(
            "update",
            &args(json!({"id": "INV-1", "status": "cancelled"})),
        ));
        assert!(message.contains("Pending, Paid, Overdue"));
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let dispatcher = with_alice("INV-1");
        let echo = success(dispatcher.execute("delete", &args(json!({"id": "inv-1"}))));
        assert_eq!(echo["id"], "INV-1");
        assert!(dispatcher.store().list().unwrap().is_empty());

        let message = failure(dispatcher.execute("delete", &args(json!({"id": "inv-1"}))));
        assert!(message.contains("not found"));
    }

    #[test]
    fn list_projects_and_filters() {
        let dispatcher = dispatcher_with(vec![
            sample_invoice("INV-1", "Alice", InvoiceStatus::Pending),
            sample_invoice("INV-2", "Bob", InvoiceStatus::Paid),
        ]);

        let all = success(dispatcher.execute("list", &Map::new()));
        assert_eq!(all["count"], 2);
        assert_eq!(
            all["invoices"][0],
            json!({
                "id": "INV-1",
                "clientName": "Alice",
                "amount": 250.0,
                "status": "Pending",
                "dueDate": "2026-02-10"
            })
        );

        let paid = success(dispatcher.execute("list", &args(json!({"status": "PAID"}))));
        assert_eq!(paid["count"], 1);
        assert_eq!(paid["invoices"][0]["clientName"], "Bob");

        let overdue = success(dispatcher.execute("list", &args(json!({"status": "Overdue"}))));
        assert!(overdue.get("invoices").is_none());
        assert!(overdue["message"].as_str().unwrap().contains("Overdue"));
    }

    #[test]
    fn list_on_empty_store_returns_a_message() {
        let dispatcher = dispatcher_with(vec![]);
        let result = success(dispatcher.execute("list", &Map::new()));
        assert!(result["message"].is_string());
    }

    #[test]
    fn unknown_operation_is_reported_in_band() {
        let dispatcher = dispatcher_with(vec![]);
        let result = dispatcher.execute("archive", &Map::new());
        assert_eq!(result.into_response(), json!({"error": "unknown operation archive"}));
    }
}
