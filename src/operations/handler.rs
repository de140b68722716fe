use crate::store::{Invoice, InvoiceStatus, InvoiceStore};
use chrono::NaiveDate;
use serde_json::{Value, json};

/// A validated operation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(NewInvoice),
    Read { id: String },
    Update(InvoicePatch),
    Delete { id: String },
    List { status: Option<InvoiceStatus> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub client_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub observations: Option<String>,
}

impl NewInvoice {
    pub fn into_invoice(self, id: String, today: NaiveDate) -> Invoice {
        Invoice {
            id,
            status: InvoiceStatus::for_new(self.due_date, today),
            client_name: self.client_name,
            amount: self.amount,
            issue_date: today,
            due_date: self.due_date,
            observations: self.observations.unwrap_or_default(),
        }
    }
}

/// Fields to overwrite on an existing invoice; `None` leaves a field alone.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePatch {
    pub id: String,
    pub client_name: Option<String>,
    pub amount: Option<f64>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub observations: Option<String>,
}

impl InvoicePatch {
    pub fn apply(&self, invoice: &mut Invoice) {
        if let Some(client_name) = &self.client_name {
            invoice.client_name = client_name.clone();
        }
        if let Some(amount) = self.amount {
            invoice.amount = amount;
        }
        if let Some(issue_date) = self.issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(due_date) = self.due_date {
            invoice.due_date = due_date;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        if let Some(observations) = &self.observations {
            invoice.observations = observations.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.amount.is_none()
            && self.issue_date.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.observations.is_none()
    }
}

/// Look up an invoice by id, ignoring case.
pub fn find_invoice(store: &dyn InvoiceStore, id: &str) -> Result<Invoice, String> {
    store
        .list()
        .map_err(|e| format!("could not read invoices: {}", e))?
        .into_iter()
        .find(|invoice| invoice.matches_id(id))
        .ok_or_else(|| format!("invoice {} not found", id))
}

pub fn create(
    store: &dyn InvoiceStore,
    new: NewInvoice,
    id: String,
    today: NaiveDate,
) -> Result<Value, String> {
    let invoice = new.into_invoice(id, today);
    let echo = json!({
        "success": true,
        "id": invoice.id,
        "clientName": invoice.client_name,
        "amount": invoice.amount,
        "status": invoice.status,
    });
    store
        .add(invoice)
        .map_err(|e| format!("could not save the invoice: {}", e))?;
    Ok(echo)
}

pub fn read(store: &dyn InvoiceStore, id: &str) -> Result<Value, String> {
    let invoice = find_invoice(store, id)?;
    serde_json::to_value(invoice).map_err(|e| e.to_string())
}

/// An empty patch answers like a real update but leaves the store untouched.
pub fn update(store: &dyn InvoiceStore, patch: &InvoicePatch) -> Result<Value, String> {
    let mut invoice = find_invoice(store, &patch.id)?;
    if patch.is_empty() {
        return Ok(json!({ "success": true, "invoice": invoice }));
    }
    patch.apply(&mut invoice);
    store
        .update(invoice.clone())
        .map_err(|e| format!("could not update invoice {}: {}", invoice.id, e))?;
    Ok(json!({ "success": true, "invoice": invoice }))
}

pub fn delete(store: &dyn InvoiceStore, id: &str) -> Result<Value, String> {
    let invoice = find_invoice(store, id)?;
    store
        .delete(&invoice.id)
        .map_err(|e| format!("could not delete invoice {}: {}", invoice.id, e))?;
    Ok(json!({
        "success": true,
        "id": invoice.id,
        "clientName": invoice.client_name,
    }))
}

pub fn list(store: &dyn InvoiceStore, status: Option<InvoiceStatus>) -> Result<Value, String> {
    let invoices = store
        .list()
        .map_err(|e| format!("could not read invoices: {}", e))?;

    if invoices.is_empty() {
        return Ok(json!({ "message": "There are no invoices yet." }));
    }

    let projected: Vec<Value> = invoices
        .iter()
        .filter(|invoice| status.is_none_or(|s| invoice.status == s))
        .map(|invoice| {
            json!({
                "id": invoice.id,
                "clientName": invoice.client_name,
                "amount": invoice.amount,
                "status": invoice.status,
                "dueDate": invoice.due_date,
            })
        })
        .collect();

    if projected.is_empty() {
        let status = status.map(|s| s.to_string()).unwrap_or_default();
        return Ok(json!({
            "message": format!("No invoices with status {} were found.", status)
        }));
    }

    Ok(json!({ "count": projected.len(), "invoices": projected }))
}
