//! Invoice records and the persistence seam the dispatcher drives.

pub mod file;
pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
        }
    }

    /// Case-insensitive parse of a status name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Status of a freshly created invoice: overdue only when the due date is
    /// strictly before `today`.
    pub fn for_new(due_date: NaiveDate, today: NaiveDate) -> Self {
        if due_date < today {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Pending
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub client_name: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub observations: String,
}

impl Invoice {
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id.trim())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invoice {0} not found")]
    NotFound(String),

    #[error("invoice {0} already exists")]
    Duplicate(String),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data is corrupt: {0}")]
    Corrupt(String),
}

/// The external invoice collection. Implementations synchronize internally.
pub trait InvoiceStore: Send + Sync {
    fn add(&self, invoice: Invoice) -> Result<(), StoreError>;

    /// Replace the record whose id matches `invoice.id` (case-insensitive).
    fn update(&self, invoice: Invoice) -> Result<(), StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// A snapshot of all records in insertion order.
    fn list(&self) -> Result<Vec<Invoice>, StoreError>;
}

/// Shared by the store implementations so both behave identically.
pub(crate) fn apply_add(records: &mut Vec<Invoice>, invoice: Invoice) -> Result<(), StoreError> {
    if records.iter().any(|r| r.matches_id(&invoice.id)) {
        return Err(StoreError::Duplicate(invoice.id));
    }
    records.push(invoice);
    Ok(())
}

pub(crate) fn apply_update(records: &mut [Invoice], invoice: Invoice) -> Result<(), StoreError> {
    let slot = records
        .iter_mut()
        .find(|r| r.matches_id(&invoice.id))
        .ok_or_else(|| StoreError::NotFound(invoice.id.clone()))?;
    *slot = invoice;
    Ok(())
}

pub(crate) fn apply_delete(records: &mut Vec<Invoice>, id: &str) -> Result<(), StoreError> {
    let index = records
        .iter()
        .position(|r| r.matches_id(id))
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    records.remove(index);
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_invoice(id: &str, client: &str, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: id.to_string(),
        client_name: client.to_string(),
        amount: 250.0,
        issue_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        status,
        observations: String::new(),
    }
}
