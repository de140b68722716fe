pub mod args;
pub mod dispatcher;
pub mod handler;
pub mod registry;

use serde_json::{Value, json};

pub use dispatcher::Dispatcher;
pub use handler::Operation;
pub use registry::{OperationKind, OperationRegistry};

/// Outcome of one operation, as fed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    Success(Value),
    Failure(String),
}

impl OperationResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, OperationResult::Failure(_))
    }

    /// The `response` object of a function response part.
    pub fn into_response(self) -> Value {
        match self {
            OperationResult::Success(value @ Value::Object(_)) => value,
            OperationResult::Success(other) => json!({ "result": other }),
            OperationResult::Failure(message) => json!({ "error": message }),
        }
    }
}

impl From<Result<Value, String>> for OperationResult {
    fn from(result: Result<Value, String>) -> Self {
        match result {
            Ok(value) => OperationResult::Success(value),
            Err(message) => OperationResult::Failure(message),
        }
    }
}
