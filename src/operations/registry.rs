use super::handler::{InvoicePatch, NewInvoice, Operation};
use super::args::ArgReader;
use crate::providers::gemini::types::{FunctionDeclaration, Schema, SchemaType, Tool};
use crate::store::InvoiceStatus;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Every operation the model may call. The tool schema and the dispatcher are
/// both generated from this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Create,
        OperationKind::Read,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::List,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::List => "list",
        }
    }

    pub fn declaration(&self) -> FunctionDeclaration {
        let (description, properties, required): (&str, Properties, &[&str]) = match self {
            OperationKind::Create => (
                "Create a new invoice. The issue date is always today and the status is \
                 computed from the due date (Overdue when already past, otherwise Pending).",
                vec![
                    ("clientName", text("Name of the client being billed")),
                    ("amount", number("Invoice amount, non-negative")),
                    ("dueDate", text("Due date as YYYY-MM-DD")),
                    ("observations", text("Optional free-text notes")),
                ],
                &["clientName", "amount", "dueDate"],
            ),
            OperationKind::Read => (
                "Fetch one invoice by id (case-insensitive).",
                vec![("id", id_schema())],
                &["id"],
            ),
            OperationKind::Update => (
                "Change fields of an existing invoice. Only the fields given are changed.",
                vec![
                    ("id", id_schema()),
                    ("clientName", text("New client name")),
                    ("amount", number("New amount, non-negative")),
                    ("issueDate", text("New issue date as YYYY-MM-DD")),
                    ("dueDate", text("New due date as YYYY-MM-DD")),
                    ("status", status_schema("New status")),
                    ("observations", text("New notes")),
                ],
                &["id"],
            ),
            OperationKind::Delete => (
                "Permanently delete an invoice. Only call this after the user explicitly \
                 confirmed the deletion.",
                vec![("id", id_schema())],
                &["id"],
            ),
            OperationKind::List => (
                "List invoices, optionally filtered by status. Returns id, client, amount, \
                 status and due date for each.",
                vec![("status", status_schema("Only list invoices with this status"))],
                &[],
            ),
        };

        let properties: BTreeMap<String, Schema> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        FunctionDeclaration {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters: Schema {
                properties: Some(properties),
                required: (!required.is_empty())
                    .then(|| required.iter().map(|s| s.to_string()).collect()),
                ..Schema::of(SchemaType::Object, "Operation arguments")
            },
        }
    }

    /// Build the typed operation from raw arguments.
    pub fn parse(&self, args: &Map<String, Value>) -> Result<Operation, String> {
        let reader = ArgReader::new(args);
        Ok(match self {
            OperationKind::Create => Operation::Create(NewInvoice {
                client_name: reader.required_string("clientName")?,
                amount: reader.required_amount("amount")?,
                due_date: reader.required_date("dueDate")?,
                observations: reader.optional_string("observations")?,
            }),
            OperationKind::Read => Operation::Read {
                id: reader.required_string("id")?,
            },
            OperationKind::Update => Operation::Update(InvoicePatch {
                id: reader.required_string("id")?,
                client_name: reader
                    .optional_string("clientName")?
                    .filter(|s| !s.is_empty()),
                amount: reader.optional_amount("amount")?,
                issue_date: reader.optional_date("issueDate")?,
                due_date: reader.optional_date("dueDate")?,
                status: reader.optional_status("status")?,
                observations: reader.optional_string("observations")?,
            }),
            OperationKind::Delete => Operation::Delete {
                id: reader.required_string("id")?,
            },
            OperationKind::List => Operation::List {
                status: reader.optional_status("status")?,
            },
        })
    }
}

type Properties = Vec<(&'static str, Schema)>;

fn text(description: &str) -> Schema {
    Schema::of(SchemaType::String, description)
}

fn number(description: &str) -> Schema {
    Schema::of(SchemaType::Number, description)
}

fn id_schema() -> Schema {
    text("Invoice id, e.g. INV-1A2B3C4D")
}

fn status_schema(description: &str) -> Schema {
    let mut schema = text(description);
    schema.enum_values = Some(
        InvoiceStatus::ALL
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
    );
    schema
}

/// Name → operation lookup plus the schema exposed to the provider.
pub struct OperationRegistry {
    operations: HashMap<String, (OperationKind, FunctionDeclaration)>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        let operations = OperationKind::ALL
            .into_iter()
            .map(|kind| (kind.name().to_string(), (kind, kind.declaration())))
            .collect();
        Self { operations }
    }

    pub fn resolve(&self, name: &str) -> Option<OperationKind> {
        self.operations.get(name).map(|(kind, _)| *kind)
    }

    /// Required fields (per the exposed schema) that are absent or null.
    pub fn missing_required(
        &self,
        kind: OperationKind,
        args: &Map<String, Value>,
    ) -> Vec<String> {
        let Some((_, declaration)) = self.operations.get(kind.name()) else {
            return Vec::new();
        };
        declaration
            .parameters
            .required
            .iter()
            .flatten()
            .filter(|field| args.get(field.as_str()).is_none_or(Value::is_null))
            .cloned()
            .collect()
    }

    /// Declarations in a stable order, as sent to the provider.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        OperationKind::ALL
            .iter()
            .filter_map(|kind| self.operations.get(kind.name()))
            .map(|(_, declaration)| declaration.clone())
            .collect()
    }

    pub fn tool(&self) -> Tool {
        Tool {
            function_declarations: self.declarations(),
        }
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
