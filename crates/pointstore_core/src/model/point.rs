//! Point domain model.
//!
//! # Responsibility
//! - Define the atomic claim/feeling record shared across messages.
//! - Map between stored point documents and the typed record.
//!
//! # Invariants
//! - `search_tokens`, when present, is exactly the tokenization of
//!   `content`; it is derived on write, never caller-supplied state.
//! - `revision` presence means the point is already persisted.

use crate::db::store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Back-reference to an earlier point version this point supersedes or
/// responds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointReference {
    pub point_id: String,
}

impl PointReference {
    pub fn new(point_id: impl Into<String>) -> Self {
        Self {
            point_id: point_id.into(),
        }
    }
}

/// Atomic claim record, independently stored and referenceable by one or
/// more messages.
///
/// Absent optional fields are omitted from the stored document entirely,
/// which keeps `Exists` selector guards meaningful.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Point {
    /// Stable identifier; `None` until the store assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Store revision token; presence signals "already persisted".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Category tag, e.g. "feelings".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_author: Option<String>,
    /// Unix epoch milliseconds; defaulted to write time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Derived search tokens; present only when `content` yields at least
    /// one token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_tokens: Option<Vec<String>>,
    /// Back-references to earlier point versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_history: Option<Vec<PointReference>>,
}

impl Point {
    /// Creates an unsaved point holding only content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Whether the store already holds a copy of this point.
    pub fn is_saved(&self) -> bool {
        self.revision.is_some()
    }

    /// Decodes a stored document, adopting the store's id and revision.
    pub(crate) fn from_document(doc: &Document) -> Result<Self, String> {
        let mut point: Point = serde_json::from_value(Value::Object(doc.body.clone()))
            .map_err(|err| format!("invalid point document `{}`: {err}", doc.id))?;
        point.id = Some(doc.id.clone());
        point.revision = Some(doc.revision.clone());
        Ok(point)
    }
}
