//! History recorder use case.
//!
//! Turns sent exchanges and unsent drafts into history records, and files
//! them under the selected collection when there is one.

use async_trait::async_trait;
use relay_domain::{
    Collection, CollectionItem, HistoryRecord, Identity, RecordFields, RequestTemplate,
};
use serde_json::Value;

use crate::ports::{Clock, IdentityProvider, RecordError, RecordStore, RecordedExchange, Recorder};

/// Records requests against a [`RecordStore`] on behalf of the current identity.
pub struct HistoryRecorder<R, I, C> {
    store: R,
    identity: I,
    clock: C,
}

impl<R, I, C> HistoryRecorder<R, I, C>
where
    R: RecordStore,
    I: IdentityProvider,
    C: Clock,
{
    /// Creates a new recorder.
    #[must_use]
    pub const fn new(store: R, identity: I, clock: C) -> Self {
        Self {
            store,
            identity,
            clock,
        }
    }

    /// Returns the underlying record store.
    #[must_use]
    pub const fn store(&self) -> &R {
        &self.store
    }

    /// Saves an unsent template as a history entry (and collection item
    /// when `collection_id` is given).
    ///
    /// The URL and headers are stored as authored. The body is kept only
    /// when it is valid JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Unauthenticated`] without an identity, or
    /// the first failed write.
    pub async fn save_draft(
        &self,
        template: &RequestTemplate,
        collection_id: Option<&str>,
    ) -> Result<HistoryRecord, RecordError> {
        let identity = self.require_identity().await?;

        let body = serde_json::from_str::<Value>(&template.body_text).ok();

        let fields = RecordFields {
            user_id: identity.user_id.clone(),
            url: template.url.clone(),
            method: template.method,
            headers: template.headers_text_opt().map(str::to_string),
            body,
            params: template.params.clone(),
            response: None,
            created_at: self.clock.now(),
        };

        let saved = self
            .store
            .insert_history(&identity, HistoryRecord::new(fields.clone()))
            .await?;

        if let Some(collection_id) = collection_id {
            self.store
                .insert_collection_item(&identity, CollectionItem::new(collection_id, fields))
                .await?;
        }

        tracing::info!(url = %template.url, "saved draft request");
        Ok(saved)
    }

    /// Lists the current identity's history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the store cannot be read.
    pub async fn history(&self) -> Result<Vec<HistoryRecord>, RecordError> {
        let identity = self.require_identity().await?;
        self.store.list_history(&identity).await
    }

    /// Lists the current identity's collections, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the store cannot be read.
    pub async fn collections(&self) -> Result<Vec<Collection>, RecordError> {
        let identity = self.require_identity().await?;
        self.store.list_collections(&identity).await
    }

    /// Creates a collection owned by the current identity.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the write fails.
    pub async fn create_collection(&self, name: &str) -> Result<Collection, RecordError> {
        let identity = self.require_identity().await?;
        self.store.create_collection(&identity, name).await
    }

    /// Lists a collection's items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the store cannot be read.
    pub async fn collection_items(
        &self,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>, RecordError> {
        let identity = self.require_identity().await?;
        self.store.list_collection_items(&identity, collection_id).await
    }

    /// Looks up one history record by id.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the store cannot be read.
    pub async fn history_entry(&self, id: &str) -> Result<Option<HistoryRecord>, RecordError> {
        let history = self.history().await?;
        Ok(history.into_iter().find(|record| record.id.as_deref() == Some(id)))
    }

    /// Looks up one item of a collection by id.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the store cannot be read.
    pub async fn collection_item(
        &self,
        collection_id: &str,
        item_id: &str,
    ) -> Result<Option<CollectionItem>, RecordError> {
        let items = self.collection_items(collection_id).await?;
        Ok(items.into_iter().find(|item| item.id.as_deref() == Some(item_id)))
    }

    /// Deletes a history record.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the write fails.
    pub async fn delete_history(&self, id: &str) -> Result<(), RecordError> {
        let identity = self.require_identity().await?;
        self.store.delete_history(&identity, id).await?;
        tracing::info!(%id, "deleted history record");
        Ok(())
    }

    /// Deletes a collection and its items.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the write fails.
    pub async fn delete_collection(&self, id: &str) -> Result<(), RecordError> {
        let identity = self.require_identity().await?;
        self.store.delete_collection(&identity, id).await?;
        tracing::info!(%id, "deleted collection");
        Ok(())
    }

    /// Deletes one collection item.
    ///
    /// # Errors
    ///
    /// Returns an error without an identity or if the write fails.
    pub async fn delete_collection_item(&self, id: &str) -> Result<(), RecordError> {
        let identity = self.require_identity().await?;
        self.store.delete_collection_item(&identity, id).await
    }

    async fn require_identity(&self) -> Result<Identity, RecordError> {
        self.identity
            .current()
            .await
            .ok_or(RecordError::Unauthenticated)
    }
}

#[async_trait]
impl<R, I, C> Recorder for HistoryRecorder<R, I, C>
where
    R: RecordStore,
    I: IdentityProvider,
    C: Clock,
{
    async fn record(&self, exchange: RecordedExchange) -> Result<(), RecordError> {
        let Some(identity) = self.identity.current().await else {
            tracing::warn!("not signed in, request not saved to history");
            return Ok(());
        };

        let RecordedExchange {
            request,
            body,
            params,
            headers_text,
            response,
            collection_id,
        } = exchange;

        let fields = RecordFields {
            user_id: identity.user_id.clone(),
            url: request.final_url,
            method: request.method,
            headers: headers_text,
            body,
            params,
            response: Some(response),
            created_at: self.clock.now(),
        };

        let mut first_error = None;

        if let Err(e) = self
            .store
            .insert_history(&identity, HistoryRecord::new(fields.clone()))
            .await
        {
            tracing::error!(error = %e, "failed to save history record");
            first_error = Some(e);
        }

        if let Some(collection_id) = collection_id {
            let item = CollectionItem::new(collection_id, fields);
            if let Err(e) = self.store.insert_collection_item(&identity, item).await {
                tracing::error!(error = %e, "failed to save collection item");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
