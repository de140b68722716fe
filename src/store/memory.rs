use super::{Invoice, InvoiceStore, StoreError, apply_add, apply_delete, apply_update};
use std::sync::{PoisonError, RwLock};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Invoice>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Invoice>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl InvoiceStore for MemoryStore {
    fn add(&self, invoice: Invoice) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        apply_add(&mut records, invoice)
    }

    fn update(&self, invoice: Invoice) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        apply_update(&mut records, invoice)
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        apply_delete(&mut records, id)
    }

    fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
