//! Offline record store.
//!
//! Keeps history, collections and collection items as JSON arrays in the
//! data directory:
//! - `history.json`
//! - `collections.json`
//! - `collection_items.json`

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use relay_application::ports::{RecordError, RecordStore};
use relay_domain::{Collection, CollectionItem, HistoryRecord, Identity};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const HISTORY_FILE: &str = "history.json";
const COLLECTIONS_FILE: &str = "collections.json";
const ITEMS_FILE: &str = "collection_items.json";

/// Record store persisting to local JSON files.
///
/// Writes within one process are serialized; separate processes race on a
/// last-write-wins basis. Each file is replaced atomically, so an
/// interrupted write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileRecordStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, RecordError> {
        let path = self.dir.join(file);
        let read_error =
            |e: &dyn std::fmt::Display| RecordError::Read(format!("{}: {e}", path.display()));

        match fs::read(&path).await {
            Ok(bytes) => from_json_bytes(&bytes).map_err(|e| read_error(&e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(read_error(&e)),
        }
    }

    async fn append<T>(&self, file: &str, record: T) -> Result<T, RecordError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let _guard = self.write_lock.lock().await;

        let mut records: Vec<T> = self.read_all(file).await?;
        records.push(record.clone());
        self.write_all(file, &records).await?;

        Ok(record)
    }

    /// Drops the records matching `doomed`; the file is left alone when
    /// nothing matches.
    async fn remove_where<T, F>(&self, file: &str, doomed: F) -> Result<usize, RecordError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&T) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut records: Vec<T> = self.read_all(file).await?;
        let before = records.len();
        records.retain(|r| !doomed(r));
        let removed = before - records.len();

        if removed > 0 {
            self.write_all(file, &records).await?;
        }
        Ok(removed)
    }

    async fn write_all<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), RecordError> {
        let path = self.dir.join(file);
        let write_error =
            |e: &dyn std::fmt::Display| RecordError::Write(format!("{}: {e}", path.display()));

        let bytes = to_json_stable_bytes(records).map_err(|e| write_error(&e))?;
        fs::create_dir_all(&self.dir).await.map_err(|e| write_error(&e))?;

        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await.map_err(|e| write_error(&e))?;
        fs::rename(&tmp, &path).await.map_err(|e| write_error(&e))?;

        tracing::debug!(path = %path.display(), count = records.len(), "wrote records");
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn insert_history(
        &self,
        _identity: &Identity,
        mut record: HistoryRecord,
    ) -> Result<HistoryRecord, RecordError> {
        record.id = Some(new_id());
        self.append(HISTORY_FILE, record).await
    }

    async fn list_history(&self, identity: &Identity) -> Result<Vec<HistoryRecord>, RecordError> {
        let mut records: Vec<HistoryRecord> = self.read_all(HISTORY_FILE).await?;
        records.retain(|r| r.fields.user_id == identity.user_id);
        records.sort_by(|a, b| b.fields.created_at.cmp(&a.fields.created_at));
        Ok(records)
    }

    async fn create_collection(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Collection, RecordError> {
        let collection = Collection {
            id: new_id(),
            name: name.to_string(),
            user_id: identity.user_id.clone(),
            created_at: chrono::Utc::now(),
        };
        self.append(COLLECTIONS_FILE, collection).await
    }

    async fn list_collections(&self, identity: &Identity) -> Result<Vec<Collection>, RecordError> {
        let mut collections: Vec<Collection> = self.read_all(COLLECTIONS_FILE).await?;
        collections.retain(|c| c.user_id == identity.user_id);
        collections.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(collections)
    }

    async fn insert_collection_item(
        &self,
        _identity: &Identity,
        mut item: CollectionItem,
    ) -> Result<CollectionItem, RecordError> {
        item.id = Some(new_id());
        self.append(ITEMS_FILE, item).await
    }

    async fn list_collection_items(
        &self,
        identity: &Identity,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>, RecordError> {
        let mut items: Vec<CollectionItem> = self.read_all(ITEMS_FILE).await?;
        items.retain(|i| i.collection_id == collection_id && i.fields.user_id == identity.user_id);
        items.sort_by(|a, b| a.fields.created_at.cmp(&b.fields.created_at));
        Ok(items)
    }

    async fn delete_history(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        self.remove_where(HISTORY_FILE, |r: &HistoryRecord| {
            r.id.as_deref() == Some(id) && r.fields.user_id == identity.user_id
        })
        .await?;
        Ok(())
    }

    async fn delete_collection(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        let removed = self
            .remove_where(COLLECTIONS_FILE, |c: &Collection| {
                c.id == id && c.user_id == identity.user_id
            })
            .await?;

        if removed > 0 {
            self.remove_where(ITEMS_FILE, |i: &CollectionItem| i.collection_id == id)
                .await?;
        }
        Ok(())
    }

    async fn delete_collection_item(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<(), RecordError> {
        self.remove_where(ITEMS_FILE, |i: &CollectionItem| {
            i.id.as_deref() == Some(id) && i.fields.user_id == identity.user_id
        })
        .await?;
        Ok(())
    }
}
