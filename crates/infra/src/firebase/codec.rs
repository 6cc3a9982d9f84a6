//! Document database wire format.
//!
//! Documents travel as `{"name": ".../documents/<collection>/<id>", "fields":
//! {"<field>": {"stringValue": ...}}}`. Only the three value kinds a record can
//! hold are written. On read, numbers are kept as text and nulls are dropped;
//! any other value kind is skipped with a warning rather than failing the
//! whole collection.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use admindash_core::{FieldValue, Fields, Record, RecordId};
use admindash_gateway::GatewayError;

/// One document as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    pub next_page_token: Option<String>,
}

/// Body of create/patch requests.
#[derive(Debug, Clone, Serialize)]
pub struct WriteBody {
    pub fields: Map<String, Value>,
}

impl WriteBody {
    pub fn new(fields: &Fields) -> Self {
        Self {
            fields: encode_fields(fields),
        }
    }
}

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => json!({ "stringValue": s }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        FieldValue::Timestamp(at) => {
            json!({ "timestampValue": at.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
    }
}

pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), encode_value(value)))
        .collect()
}

/// Decode one wire value. `Ok(None)` means "skip this field".
pub fn decode_value(name: &str, value: &Value) -> Result<Option<FieldValue>, GatewayError> {
    let Some(obj) = value.as_object() else {
        return Err(GatewayError::read(format!("field '{name}' is not a typed value")));
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Err(GatewayError::read(format!("field '{name}' has no value")));
    };

    let decoded = match (kind.as_str(), inner) {
        ("stringValue", Value::String(s)) => Some(FieldValue::text(s.as_str())),
        ("booleanValue", Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        ("timestampValue", Value::String(raw)) => {
            let at = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| GatewayError::read(format!("field '{name}': bad timestamp: {e}")))?;
            Some(FieldValue::Timestamp(at.with_timezone(&Utc)))
        }
        // 64-bit integers arrive as JSON strings.
        ("integerValue", Value::String(n)) => Some(FieldValue::text(n.as_str())),
        ("integerValue" | "doubleValue", Value::Number(n)) => Some(FieldValue::text(n.to_string())),
        ("nullValue", _) => None,
        (other, _) => {
            tracing::warn!(field = name, kind = other, "skipping unsupported document value");
            None
        }
    };
    Ok(decoded)
}

pub fn decode_fields(raw: &Map<String, Value>) -> Result<Fields, GatewayError> {
    let mut fields = Fields::new();
    for (name, value) in raw {
        if let Some(decoded) = decode_value(name, value)? {
            fields.insert(name.as_str(), decoded);
        }
    }
    Ok(fields)
}

/// The record id is the last segment of the document's resource name.
pub fn document_id(name: &str) -> Result<RecordId, GatewayError> {
    let id = name.rsplit('/').next().unwrap_or_default();
    RecordId::parse(id).map_err(|e| GatewayError::read(format!("document name '{name}': {e}")))
}

pub fn decode_document(doc: &WireDocument) -> Result<Record, GatewayError> {
    Ok(Record::new(document_id(&doc.name)?, decode_fields(&doc.fields)?))
}

/// Field path for an update mask; names outside `[A-Za-z_][A-Za-z0-9_]*` are
/// back-quoted.
pub fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fields_encode_to_typed_values() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let fields = Fields::new()
            .with("title", "Buy milk")
            .with("completed", false)
            .with("timestamp", at);

        let body = serde_json::to_value(WriteBody::new(&fields)).unwrap();

        assert_eq!(
            body,
            json!({
                "fields": {
                    "title": { "stringValue": "Buy milk" },
                    "completed": { "booleanValue": false },
                    "timestamp": { "timestampValue": "2024-03-09T08:00:00.000000Z" }
                }
            })
        );
    }

    #[test]
    fn listed_document_decodes_to_record() {
        let page: ListPage = serde_json::from_value(json!({
            "documents": [{
                "name": "projects/demo/databases/(default)/documents/todos/abc123",
                "fields": {
                    "title": { "stringValue": "Buy milk" },
                    "completed": { "booleanValue": true },
                    "priority": { "integerValue": "3" },
                    "archivedAt": { "nullValue": null },
                    "tags": { "arrayValue": { "values": [] } }
                },
                "createTime": "2024-03-09T08:00:00Z",
                "updateTime": "2024-03-09T08:00:00Z"
            }],
            "nextPageToken": "next"
        }))
        .unwrap();

        let record = decode_document(&page.documents[0]).unwrap();
        assert_eq!(record.id.as_str(), "abc123");
        assert_eq!(record.fields.text("title").unwrap(), "Buy milk");
        assert!(record.fields.bool("completed").unwrap());
        assert_eq!(record.fields.text("priority").unwrap(), "3");
        assert!(!record.fields.contains("archivedAt"));
        assert!(!record.fields.contains("tags"));
        assert_eq!(page.next_page_token.as_deref(), Some("next"));
    }

    #[test]
    fn empty_collection_lists_as_empty_page() {
        let page: ListPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn malformed_timestamp_fails_the_document() {
        let doc = WireDocument {
            name: "x/todos/a".into(),
            fields: serde_json::from_value(json!({ "at": { "timestampValue": "yesterday" } }))
                .unwrap(),
        };
        assert!(matches!(decode_document(&doc), Err(GatewayError::Read(_))));
    }

    #[test]
    fn unusual_field_names_are_quoted_in_masks() {
        assert_eq!(field_path("coverImage"), "coverImage");
        assert_eq!(field_path("cover-image"), "`cover-image`");
        assert_eq!(field_path("1st"), "`1st`");
    }
}
