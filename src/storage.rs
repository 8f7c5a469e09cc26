use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use log::debug;
use tokio::io::AsyncWriteExt;
use crate::error::StorageError;

/// Key-addressed blob storage. A missing key reads as `None`.
pub trait Storage {
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>>;

    /// replace the whole blob under `key`; readers never see a partial write
    fn write(&self, key: &str, blob: &str) -> impl Future<Output = Result<(), StorageError>>;
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for JsonFileStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.path_for(key);
        // write aside then swap in, a crash leaves either the old or the new file
        let staging = self.dir.join(format!("{}.json.tmp", key));
        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(blob.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&staging, &target).await?;
        debug!("saved [{}] bytes to [{}]", blob.len(), target.display());
        Ok(())
    }
}

/// In-process storage. Clones share the same contents, which lets a test
/// drop a store and reload a fresh one from "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// make every following write fail until turned off again
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn put(&self, key: impl Into<String>, blob: impl Into<String>) {
        self.blobs.borrow_mut().insert(key.into(), blob.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(std::io::Error::new(ErrorKind::Other, "storage is read-only").into());
        }
        self.put(key, blob);
        Ok(())
    }
}
