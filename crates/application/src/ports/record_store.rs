//! Record store port
//!
//! The external document store holding history, collections and
//! collection items.

use std::sync::Arc;

use async_trait::async_trait;
use relay_domain::{Collection, CollectionItem, HistoryRecord, Identity};

use super::RecordError;

/// Insert, list and delete access to persisted records.
///
/// Every call carries the identity whose records are addressed; stores
/// that talk to a remote backend use its credential.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a history record and returns it with its assigned id.
    async fn insert_history(
        &self,
        identity: &Identity,
        record: HistoryRecord,
    ) -> Result<HistoryRecord, RecordError>;

    /// Lists the identity's history, newest first.
    async fn list_history(&self, identity: &Identity) -> Result<Vec<HistoryRecord>, RecordError>;

    /// Creates a named collection.
    async fn create_collection(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Collection, RecordError>;

    /// Lists the identity's collections, oldest first.
    async fn list_collections(&self, identity: &Identity) -> Result<Vec<Collection>, RecordError>;

    /// Inserts an item into a collection and returns it with its assigned id.
    async fn insert_collection_item(
        &self,
        identity: &Identity,
        item: CollectionItem,
    ) -> Result<CollectionItem, RecordError>;

    /// Lists a collection's items, oldest first.
    async fn list_collection_items(
        &self,
        identity: &Identity,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>, RecordError>;

    /// Deletes one history record. Deleting an unknown id is not an error.
    async fn delete_history(&self, identity: &Identity, id: &str) -> Result<(), RecordError>;

    /// Deletes a collection together with its items.
    async fn delete_collection(&self, identity: &Identity, id: &str) -> Result<(), RecordError>;

    /// Deletes one collection item.
    async fn delete_collection_item(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<(), RecordError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn insert_history(
        &self,
        identity: &Identity,
        record: HistoryRecord,
    ) -> Result<HistoryRecord, RecordError> {
        (**self).insert_history(identity, record).await
    }

    async fn list_history(&self, identity: &Identity) -> Result<Vec<HistoryRecord>, RecordError> {
        (**self).list_history(identity).await
    }

    async fn create_collection(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Collection, RecordError> {
        (**self).create_collection(identity, name).await
    }

    async fn list_collections(&self, identity: &Identity) -> Result<Vec<Collection>, RecordError> {
        (**self).list_collections(identity).await
    }

    async fn insert_collection_item(
        &self,
        identity: &Identity,
        item: CollectionItem,
    ) -> Result<CollectionItem, RecordError> {
        (**self).insert_collection_item(identity, item).await
    }

    async fn list_collection_items(
        &self,
        identity: &Identity,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>, RecordError> {
        (**self).list_collection_items(identity, collection_id).await
    }

    async fn delete_history(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        (**self).delete_history(identity, id).await
    }

    async fn delete_collection(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        (**self).delete_collection(identity, id).await
    }

    async fn delete_collection_item(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<(), RecordError> {
        (**self).delete_collection_item(identity, id).await
    }
}
