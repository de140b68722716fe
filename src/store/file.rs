use super::{Invoice, InvoiceStore, StoreError, apply_add, apply_delete, apply_update};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Invoices kept as a pretty-printed JSON array on disk.
///
/// `list` re-reads the file on every call under a shared lock. Mutations take
/// the lock exclusively and write a sibling temp file that is renamed over the
/// original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            path,
            lock: RwLock::new(()),
        };
        // Fail early on a corrupt file instead of on the first operation.
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Invoice>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, records: &[Invoice]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate(
        &self,
        change: impl FnOnce(&mut Vec<Invoice>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load()?;
        change(&mut records)?;
        self.save(&records)
    }
}

impl InvoiceStore for JsonFileStore {
    fn add(&self, invoice: Invoice) -> Result<(), StoreError> {
        self.mutate(|records| apply_add(records, invoice))
    }

    fn update(&self, invoice: Invoice) -> Result<(), StoreError> {
        self.mutate(|records| apply_update(records, invoice))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|records| apply_delete(records, id))
    }

    fn list(&self) -> Result<Vec<Invoice>, StoreError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InvoiceStatus, sample_invoice};
    use pretty_assertions::assert_eq;

    #[test]
    fn records_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("invoices.json");

        let store = JsonFileStore::open(&path).unwrap();
        store
            .add(sample_invoice("INV-1", "Alice", InvoiceStatus::Pending))
            .unwrap();
        store
            .add(sample_invoice("INV-2", "Bob", InvoiceStatus::Paid))
            .unwrap();
        store.delete("inv-1").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let records = reopened.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], sample_invoice("INV-2", "Bob", InvoiceStatus::Paid));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn concurrent_writers_and_readers_agree() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("invoices.json")).unwrap();

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for n in 0..5 {
                        let id = format!("INV-{}{}", writer, n);
                        store
                            .add(sample_invoice(&id, "Alice", InvoiceStatus::Pending))
                            .unwrap();
                    }
                });
            }
            for _ in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..5 {
                        assert!(store.list().unwrap().len() <= 20);
                    }
                });
            }
        });

        assert_eq!(store.list().unwrap().len(), 20);
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoices.json");
        let store = JsonFileStore::open(&path).unwrap();
        store
            .add(sample_invoice("INV-1", "Alice", InvoiceStatus::Pending))
            .unwrap();

        assert!(store.delete("INV-404").is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
