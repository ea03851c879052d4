//! Integration tests for the reqwest adapters against an in-process axum
//! server standing in for the proxy and the history backend.

#![allow(clippy::unwrap_used)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use relay_application::ports::{ProxyClient, ProxyError, RecordError, RecordStore};
use relay_application::{Dispatcher, HistoryRecorder, VariableResolver};
use relay_domain::{
    CollectionItem, FailureKind, HistoryRecord, HttpMethod, Identity, RecordFields,
    RequestTemplate, ResolvedRequest,
};
use relay_infrastructure::{
    BackendRecordStore, ProbeNetworkStatus, ReqwestProxyClient, StaticIdentityProvider,
    SystemClock,
};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "secret-token";

#[derive(Clone, Default)]
struct Backend {
    history: Arc<Mutex<Vec<Value>>>,
    collections: Arc<Mutex<Vec<Value>>>,
    items: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn with_id(mut row: Value, prefix: &str, n: usize) -> Value {
    row["id"] = json!(format!("{prefix}{n}"));
    row
}

async fn proxy(Json(payload): Json<Value>) -> Response {
    let url = payload["url"].as_str().unwrap_or_default().to_string();
    if url.contains("/down") {
        return (StatusCode::BAD_GATEWAY, Json(json!({"error": "upstream down"}))).into_response();
    }
    if url.contains("/plain") {
        return "hello there".into_response();
    }
    Json(json!({ "received": payload })).into_response()
}

async fn insert_history(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut history = backend.history.lock().unwrap();
    let row = with_id(row, "h", history.len() + 1);
    history.push(row.clone());
    // Mirrors a row-returning insert.
    Json(json!([row])).into_response()
}

async fn list_history(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut rows = backend.history.lock().unwrap().clone();
    rows.reverse();
    Json(rows).into_response()
}

async fn create_collection(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut collections = backend.collections.lock().unwrap();
    let row = json!({
        "id": format!("c{}", collections.len() + 1),
        "name": body["name"],
        "user_id": body["user_id"],
        "created_at": "2025-01-01T00:00:00Z",
    });
    collections.push(row.clone());
    Json(row).into_response()
}

async fn list_collections(State(backend): State<Backend>) -> Json<Vec<Value>> {
    Json(backend.collections.lock().unwrap().clone())
}

async fn insert_item(
    State(backend): State<Backend>,
    Path(collection_id): Path<String>,
    Json(row): Json<Value>,
) -> Response {
    if row["collection_id"] != json!(collection_id) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let mut items = backend.items.lock().unwrap();
    let row = with_id(row, "i", items.len() + 1);
    items.push(row.clone());
    Json(row).into_response()
}

async fn list_items(
    State(backend): State<Backend>,
    Path(collection_id): Path<String>,
) -> Json<Vec<Value>> {
    let items = backend.items.lock().unwrap();
    Json(
        items
            .iter()
            .filter(|i| i["collection_id"] == json!(collection_id))
            .cloned()
            .collect(),
    )
}

fn remove_row(rows: &Mutex<Vec<Value>>, id: &str) -> StatusCode {
    let mut rows = rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|r| r["id"] != json!(id));
    if rows.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn delete_history(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    remove_row(&backend.history, &id)
}

async fn delete_collection(State(backend): State<Backend>, Path(id): Path<String>) -> StatusCode {
    backend
        .items
        .lock()
        .unwrap()
        .retain(|i| i["collection_id"] != json!(id));
    remove_row(&backend.collections, &id)
}

async fn delete_item(State(backend): State<Backend>, Path(id): Path<String>) -> StatusCode {
    remove_row(&backend.items, &id)
}

async fn spawn_server(backend: Backend) -> Url {
    let app = Router::new()
        .route("/proxy", post(proxy))
        .route("/history", get(list_history).post(insert_history))
        .route("/collections", get(list_collections).post(create_collection))
        .route("/history/{id}", delete(delete_history))
        .route("/collections/{id}", delete(delete_collection))
        .route("/collections/{id}/items", get(list_items).post(insert_item))
        .route("/items/{id}", delete(delete_item))
        .with_state(backend);

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn online() -> ProbeNetworkStatus {
    ProbeNetworkStatus::with_probe(SocketAddr::from((Ipv4Addr::LOCALHOST, 9)))
}

fn identity() -> Identity {
    Identity::new("user-1").with_token(TOKEN)
}

fn fields(url: &str) -> RecordFields {
    RecordFields {
        user_id: "user-1".to_string(),
        url: url.to_string(),
        method: HttpMethod::Get,
        headers: None,
        body: None,
        params: Vec::new(),
        response: Some(json!({"ok": true})),
        created_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn proxy_receives_shaped_payload() {
    let base = spawn_server(Backend::default()).await;
    let client = ReqwestProxyClient::new(&base).unwrap();

    let mut request = ResolvedRequest::new(HttpMethod::Post, "https://api.x.com/users?id=42");
    request.headers.insert("X-Token".to_string(), "abc".to_string());
    request.body = Some(json!({"name": "Ada"}));

    let reply = client.forward(&request).await.unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.payload,
        json!({
            "received": {
                "url": "https://api.x.com/users?id=42",
                "method": "POST",
                "headers": {"X-Token": "abc"},
                "body": {"name": "Ada"},
            }
        })
    );
}

#[tokio::test]
async fn get_request_sends_null_body() {
    let base = spawn_server(Backend::default()).await;
    let client = ReqwestProxyClient::new(&base).unwrap();

    let reply = client
        .forward(&ResolvedRequest::new(HttpMethod::Get, "https://api.x.com"))
        .await
        .unwrap();

    assert_eq!(reply.payload["received"]["body"], Value::Null);
    assert_eq!(reply.payload["received"]["method"], "GET");
}

#[tokio::test]
async fn non_json_reply_is_wrapped_as_text() {
    let base = spawn_server(Backend::default()).await;
    let client = ReqwestProxyClient::new(&base).unwrap();

    let reply = client
        .forward(&ResolvedRequest::new(HttpMethod::Get, "https://api.x.com/plain"))
        .await
        .unwrap();

    assert_eq!(reply.payload, json!({"text": "hello there"}));
}

#[tokio::test]
async fn unreachable_proxy_is_transport_error() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ReqwestProxyClient::new(&Url::parse(&format!("http://{addr}")).unwrap()).unwrap();
    let result = client
        .forward(&ResolvedRequest::new(HttpMethod::Get, "https://api.x.com"))
        .await;

    assert!(matches!(result, Err(ProxyError::Transport(_))));
}

#[tokio::test]
async fn dispatcher_reports_remote_error() {
    let base = spawn_server(Backend::default()).await;
    let dispatcher = Dispatcher::new(ReqwestProxyClient::new(&base).unwrap(), online());

    let outcome = dispatcher
        .dispatch(&ResolvedRequest::new(HttpMethod::Get, "https://api.x.com/down"))
        .await;

    assert_eq!(outcome.message(), Some("upstream down"));
    assert!(matches!(
        outcome,
        relay_domain::DispatchOutcome::Failure {
            kind: FailureKind::Remote,
            ..
        }
    ));
}

#[tokio::test]
async fn backend_history_roundtrip() {
    let backend = Backend::default();
    let base = spawn_server(backend.clone()).await;
    let store = BackendRecordStore::new(base);

    let saved = store
        .insert_history(&identity(), HistoryRecord::new(fields("/first")))
        .await
        .unwrap();
    store
        .insert_history(&identity(), HistoryRecord::new(fields("/second")))
        .await
        .unwrap();

    assert_eq!(saved.id.as_deref(), Some("h1"));
    let urls: Vec<String> = store
        .list_history(&identity())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.fields.url)
        .collect();
    assert_eq!(urls, vec!["/second", "/first"]);
}

#[tokio::test]
async fn backend_rejects_missing_token() {
    let base = spawn_server(Backend::default()).await;
    let store = BackendRecordStore::new(base);

    let result = store
        .insert_history(&Identity::new("user-1"), HistoryRecord::new(fields("/x")))
        .await;

    assert!(matches!(result, Err(RecordError::Write(_))));
}

#[tokio::test]
async fn backend_collections_and_items() {
    let base = spawn_server(Backend::default()).await;
    let store = BackendRecordStore::new(base);

    let collection = store.create_collection(&identity(), "Users API").await.unwrap();
    assert_eq!(collection.id, "c1");
    assert_eq!(collection.user_id, "user-1");

    store
        .insert_collection_item(&identity(), CollectionItem::new(&collection.id, fields("/u")))
        .await
        .unwrap();

    let items = store
        .list_collection_items(&identity(), &collection.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].fields.url, "/u");
    assert_eq!(store.list_collections(&identity()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn backend_deletes_records() {
    let backend = Backend::default();
    let base = spawn_server(backend.clone()).await;
    let store = BackendRecordStore::new(base);

    let saved = store
        .insert_history(&identity(), HistoryRecord::new(fields("/gone")))
        .await
        .unwrap();
    let collection = store.create_collection(&identity(), "Users API").await.unwrap();
    let item = store
        .insert_collection_item(&identity(), CollectionItem::new(&collection.id, fields("/u")))
        .await
        .unwrap();

    store
        .delete_history(&identity(), saved.id.as_deref().unwrap())
        .await
        .unwrap();
    store
        .delete_collection_item(&identity(), item.id.as_deref().unwrap())
        .await
        .unwrap();
    store.delete_collection(&identity(), &collection.id).await.unwrap();

    assert!(backend.history.lock().unwrap().is_empty());
    assert!(backend.items.lock().unwrap().is_empty());
    assert!(backend.collections.lock().unwrap().is_empty());

    // Already gone is fine; a rejected token is not.
    store.delete_history(&identity(), "h1").await.unwrap();
    let rejected = store.delete_history(&Identity::new("user-1"), "h1").await;
    assert!(matches!(rejected, Err(RecordError::Write(_))));
}

#[tokio::test]
async fn send_records_to_backend() {
    let backend = Backend::default();
    let base = spawn_server(backend.clone()).await;

    let recorder = HistoryRecorder::new(
        BackendRecordStore::new(base.clone()),
        StaticIdentityProvider::new(Some(identity())),
        SystemClock::new(),
    );
    let dispatcher =
        Dispatcher::new(ReqwestProxyClient::new(&base).unwrap(), online()).with_recorder(Arc::new(recorder));

    let template = RequestTemplate::new(HttpMethod::Get, "https://api.x.com/users")
        .with_param("id", "42")
        .with_headers("Accept: application/json");

    let outcome = dispatcher
        .send(&template, &VariableResolver::empty(), Some("c9".to_string()))
        .await
        .unwrap();
    dispatcher.flush_recordings().await;

    assert!(outcome.is_success());
    let history = backend.history.lock().unwrap().clone();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["url"], "https://api.x.com/users?id=42");
    assert_eq!(history[0]["headers"], "Accept: application/json");
    assert_eq!(history[0]["params"], json!([{"key": "id", "value": "42"}]));
    assert_eq!(history[0]["response"]["received"]["method"], "GET");

    let items = backend.items.lock().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["collection_id"], "c9");
}
