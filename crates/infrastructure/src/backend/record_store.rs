//! Record store backed by the Relay REST backend.
//!
//! Endpoints, all authorized with the identity's bearer token:
//! - `POST /history`, `GET /history`
//! - `POST /collections`, `GET /collections`
//! - `POST /collections/{id}/items`, `GET /collections/{id}/items`
//! - `DELETE /history/{id}`, `DELETE /collections/{id}`, `DELETE /items/{id}`
//!
//! The backend scopes listings and deletes to the token's owner and returns
//! listings already ordered.

use async_trait::async_trait;
use relay_application::ports::{RecordError, RecordStore};
use relay_domain::{Collection, CollectionItem, HistoryRecord, Identity};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Inserts may answer with the row itself or a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Inserted<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Inserted<T> {
    fn into_first(self) -> Option<T> {
        match self {
            Self::One(row) => Some(row),
            Self::Many(rows) => rows.into_iter().next(),
        }
    }
}

#[derive(Serialize)]
struct NewCollection<'a> {
    name: &'a str,
    user_id: &'a str,
}

/// HTTP client for the history/collections backend.
#[derive(Debug, Clone)]
pub struct BackendRecordStore {
    client: Client,
    base: Url,
}

impl BackendRecordStore {
    /// Creates a store talking to the backend at `base`.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    /// Creates a store around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn url(&self, path: &str) -> Result<Url, String> {
        let joined = format!("{}/{path}", self.base.as_str().trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| format!("invalid backend URL {joined}: {e}"))
    }

    fn authorize(builder: RequestBuilder, identity: &Identity) -> RequestBuilder {
        match &identity.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post<B, T>(&self, identity: &Identity, path: &str, body: &B) -> Result<T, RecordError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let url = self.url(path).map_err(RecordError::Write)?;
        let request = self.client.post(url).json(body);
        let response = Self::authorize(request, identity)
            .send()
            .await
            .map_err(|e| RecordError::Write(e.to_string()))?;

        let response = check_status(response).map_err(RecordError::Write)?;
        let inserted: Inserted<T> = response
            .json()
            .await
            .map_err(|e| RecordError::Write(e.to_string()))?;

        inserted
            .into_first()
            .ok_or_else(|| RecordError::Write(format!("backend returned no row for {path}")))
    }

    async fn get<T>(&self, identity: &Identity, path: &str) -> Result<Vec<T>, RecordError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.url(path).map_err(RecordError::Read)?;
        let request = self.client.get(url);
        let response = Self::authorize(request, identity)
            .send()
            .await
            .map_err(|e| RecordError::Read(e.to_string()))?;

        check_status(response)
            .map_err(RecordError::Read)?
            .json()
            .await
            .map_err(|e| RecordError::Read(e.to_string()))
    }

    /// Deletes the resource at `path`; a 404 means it is already gone.
    async fn delete(&self, identity: &Identity, path: &str) -> Result<(), RecordError> {
        let url = self.url(path).map_err(RecordError::Write)?;
        let request = self.client.delete(url);
        let response = Self::authorize(request, identity)
            .send()
            .await
            .map_err(|e| RecordError::Write(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%path, "backend had nothing to delete");
            return Ok(());
        }
        check_status(response).map_err(RecordError::Write)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!("backend answered HTTP {}", status.as_u16()))
    }
}

fn items_path(collection_id: &str) -> String {
    format!("collections/{}/items", urlencoding::encode(collection_id))
}

fn resource_path(kind: &str, id: &str) -> String {
    format!("{kind}/{}", urlencoding::encode(id))
}

#[async_trait]
impl RecordStore for BackendRecordStore {
    async fn insert_history(
        &self,
        identity: &Identity,
        record: HistoryRecord,
    ) -> Result<HistoryRecord, RecordError> {
        self.post(identity, "history", &record).await
    }

    async fn list_history(&self, identity: &Identity) -> Result<Vec<HistoryRecord>, RecordError> {
        self.get(identity, "history").await
    }

    async fn create_collection(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Collection, RecordError> {
        let body = NewCollection {
            name,
            user_id: &identity.user_id,
        };
        self.post(identity, "collections", &body).await
    }

    async fn list_collections(&self, identity: &Identity) -> Result<Vec<Collection>, RecordError> {
        self.get(identity, "collections").await
    }

    async fn insert_collection_item(
        &self,
        identity: &Identity,
        item: CollectionItem,
    ) -> Result<CollectionItem, RecordError> {
        let path = items_path(&item.collection_id);
        self.post(identity, &path, &item).await
    }

    async fn list_collection_items(
        &self,
        identity: &Identity,
        collection_id: &str,
    ) -> Result<Vec<CollectionItem>, RecordError> {
        self.get(identity, &items_path(collection_id)).await
    }

    async fn delete_history(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        self.delete(identity, &resource_path("history", id)).await
    }

    async fn delete_collection(&self, identity: &Identity, id: &str) -> Result<(), RecordError> {
        self.delete(identity, &resource_path("collections", id)).await
    }

    async fn delete_collection_item(
        &self,
        identity: &Identity,
        id: &str,
    ) -> Result<(), RecordError> {
        self.delete(identity, &resource_path("items", id)).await
    }
}
