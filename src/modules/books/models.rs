use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn is_unassigned(id: &i64) -> bool {
    *id == 0
}

/// A book record as stored and returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, immutable after creation
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Genre; `type` on the wire and in the database
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Request body for create and update. Unknown keys, including `id`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInput {
    pub name: Option<String>,
    /// Read from the `type` key
    pub kind: Option<String>,
    pub author: Option<String>,
}

impl BookInput {
    /// Best-effort decode, field by field. Keys match case-insensitively with
    /// an exact match taking precedence. A field that is not a string is
    /// logged and left absent without affecting the others. A body that is
    /// not a JSON object is logged and treated as an empty one.
    pub fn decode(body: &[u8]) -> Self {
        let fields = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::warn!(body = %other, "ignoring book body that is not an object");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, body_len = body.len(), "ignoring malformed book body");
                return Self::default();
            }
        };

        Self {
            name: string_field(&fields, "name"),
            kind: string_field(&fields, "type"),
            author: string_field(&fields, "author"),
        }
    }

    /// Build an unsaved book (id 0) from this input.
    pub fn into_book(self) -> Book {
        Book {
            id: 0,
            name: self.name,
            kind: self.kind,
            author: self.author,
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key).or_else(|| {
        fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })?;

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => {
            tracing::warn!(field = key, value = %other, "ignoring non-string book field");
            None
        }
    }
}

/// The three books the in-memory store starts with.
pub fn seed_books() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            name: Some("Into the badlands".to_string()),
            kind: Some("adventure".to_string()),
            author: Some("Victor Iheanacho".to_string()),
        },
        Book {
            id: 2,
            name: Some("50 shades of grey".to_string()),
            kind: Some("romance".to_string()),
            author: Some("Victor Iheanacho".to_string()),
        },
        Book {
            id: 3,
            name: Some("Charlie and the chocolate factory".to_string()),
            kind: Some("adventure".to_string()),
            author: Some("Emmanuel Iheanacho".to_string()),
        },
    ]
}
