//! History and collection record shapes.
//!
//! The records are owned by an external store; the domain only fixes what
//! gets handed over and what comes back from listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::{HttpMethod, QueryParam, RequestTemplate};

/// Fields shared by history records and collection items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    /// Owner of the record.
    pub user_id: String,
    /// Request URL (the final URL for sent requests).
    pub url: String,
    /// HTTP method used.
    pub method: HttpMethod,
    /// Raw headers text as authored, if any.
    #[serde(default)]
    pub headers: Option<String>,
    /// Request body as JSON, if any.
    #[serde(default)]
    pub body: Option<Value>,
    /// Query parameters as authored.
    #[serde(default)]
    pub params: Vec<QueryParam>,
    /// Raw response payload, absent for drafts.
    #[serde(default)]
    pub response: Option<Value>,
    /// Creation time, used for ordering.
    pub created_at: DateTime<Utc>,
}

/// Reopens a stored record for editing.
///
/// Headers come back as their raw text and the body pretty-printed. The URL
/// is kept as stored, so a sent record's URL already carries the query its
/// params produced.
impl From<&RecordFields> for RequestTemplate {
    fn from(fields: &RecordFields) -> Self {
        let body_text = fields
            .body
            .as_ref()
            .and_then(|body| serde_json::to_string_pretty(body).ok())
            .unwrap_or_default();

        Self {
            url: fields.url.clone(),
            method: fields.method,
            params: fields.params.clone(),
            headers_text: fields.headers.clone().unwrap_or_default(),
            body_text,
        }
    }
}

/// An entry in a user's request history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Store-assigned identifier, `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Record contents.
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl HistoryRecord {
    /// Creates an unsaved history record.
    #[must_use]
    pub const fn new(fields: RecordFields) -> Self {
        Self { id: None, fields }
    }
}

/// A request saved into a named collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Store-assigned identifier, `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Collection this item belongs to.
    pub collection_id: String,
    /// Record contents.
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl CollectionItem {
    /// Creates an unsaved collection item.
    #[must_use]
    pub fn new(collection_id: impl Into<String>, fields: RecordFields) -> Self {
        Self {
            id: None,
            collection_id: collection_id.into(),
            fields,
        }
    }
}

/// A named group of saved requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owner of the collection.
    pub user_id: String,
    /// Creation time, used for ordering.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields() -> RecordFields {
        RecordFields {
            user_id: "user-1".to_string(),
            url: "https://api.x.com/users?id=42".to_string(),
            method: HttpMethod::Get,
            headers: None,
            body: None,
            params: vec![QueryParam::new("id", "42")],
            response: Some(json!({"ok": true})),
            created_at: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_history_record_is_flat() {
        let value = serde_json::to_value(HistoryRecord::new(fields())).unwrap();
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["params"], json!([{"key": "id", "value": "42"}]));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_record_reopens_as_template() {
        let mut fields = fields();
        fields.method = HttpMethod::Post;
        fields.headers = Some("Accept: application/json".to_string());
        fields.body = Some(json!({"name": "Ada"}));

        let template = RequestTemplate::from(&fields);

        assert_eq!(template.url, "https://api.x.com/users?id=42");
        assert_eq!(template.method, HttpMethod::Post);
        assert_eq!(template.params, vec![QueryParam::new("id", "42")]);
        assert_eq!(template.headers_text, "Accept: application/json");
        assert_eq!(template.body_text, "{\n  \"name\": \"Ada\"\n}");
    }

    #[test]
    fn test_record_without_headers_or_body_reopens_blank() {
        let template = RequestTemplate::from(&fields());
        assert_eq!(template.headers_text, "");
        assert_eq!(template.body_text, "");
    }

    #[test]
    fn test_collection_item_roundtrip() {
        let mut item = CollectionItem::new("col-1", fields());
        item.id = Some("item-1".to_string());

        let json = serde_json::to_string(&item).unwrap();
        let restored: CollectionItem = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, item);
    }
}
