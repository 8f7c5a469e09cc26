use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::{info, warn};
use crate::error::{BookError, StorageError};
use crate::record::PersonAddressRecord;
use crate::storage::Storage;

pub const DEFAULT_BOOK_KEY: &str = "addressBook";

/// Read-only view of the store's loading flag, cheap to clone and hand out
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, loading: bool) {
        self.0.store(loading, Ordering::Release);
    }
}

/// The persisted address book.
///
/// Memory and storage are kept in step: a mutation reaches memory only
/// after the whole updated collection has been written.
pub struct AddressBookStore<S> {
    storage: S,
    key: String,
    records: Vec<PersonAddressRecord>,
    loading: LoadingFlag,
}

impl<S: Storage> AddressBookStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_BOOK_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            records: Vec::new(),
            loading: LoadingFlag::default(),
        }
    }

    /// Replace the in-memory collection with the stored one.
    ///
    /// Unreadable or corrupt storage yields an empty book, never an error.
    pub async fn load(&mut self) {
        self.loading.set(true);
        self.records = match self.read_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!("cannot load address book, starting empty: {}", e);
                Vec::new()
            }
        };
        info!("loaded [{}] record(s) from [{}]", self.records.len(), self.key);
        self.loading.set(false);
    }

    async fn read_records(&self) -> Result<Vec<PersonAddressRecord>, StorageError> {
        let Some(blob) = self.storage.read(&self.key).await? else {
            return Ok(Vec::new());
        };
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<PersonAddressRecord> = serde_json::from_str(&blob)
            .map_err(|e| StorageError::Corrupt { key: self.key.clone(), reason: e.to_string() })?;
        Ok(dedup_by_id(records))
    }

    /// Append a record, rejecting an id already in the book.
    pub async fn add(&mut self, record: PersonAddressRecord) -> Result<(), BookError> {
        if self.get(&record.id).is_some() {
            return Err(BookError::Duplicate(record.id));
        }
        let mut updated = self.records.clone();
        let id = record.id.clone();
        updated.push(record);
        self.persist(&updated).await?;
        self.records = updated;
        info!("added [{}] to the address book", id);
        Ok(())
    }

    /// Remove the record with `id`, returning it. Unknown ids are a no-op.
    pub async fn remove(&mut self, id: &str) -> Result<Option<PersonAddressRecord>, BookError> {
        let Some(idx) = self.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let mut updated = self.records.clone();
        let removed = updated.remove(idx);
        self.persist(&updated).await?;
        self.records = updated;
        info!("removed [{}] from the address book", id);
        Ok(Some(removed))
    }

    async fn persist(&self, records: &[PersonAddressRecord]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(records)?;
        self.storage.write(&self.key, &blob).await
    }

    pub fn all(&self) -> &[PersonAddressRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&PersonAddressRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }
}

/// a hand-edited blob may repeat ids; the first one wins
fn dedup_by_id(records: Vec<PersonAddressRecord>) -> Vec<PersonAddressRecord> {
    let mut seen = std::collections::HashSet::new();
    let total = records.len();
    let records = records.into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect::<Vec<_>>();
    if records.len() != total {
        warn!("dropped [{}] stored record(s) with a repeated id", total - records.len());
    }
    records
}
