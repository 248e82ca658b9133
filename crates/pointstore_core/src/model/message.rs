//! Message domain model and write-time validation.
//!
//! # Responsibility
//! - Define the caller-facing message input and the rehydrated read view.
//! - Normalize `createdAt` inputs to epoch milliseconds for storage.
//!
//! # Invariants
//! - A message references points by id only.
//! - `created_at` is stored as epoch milliseconds and rehydrated to
//!   `DateTime<Utc>` on every read path.

use crate::db::store::Document;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shape-category name mapped to its ordered list of point ids.
pub type ShapeMap = BTreeMap<String, Vec<String>>;

/// Write-time `createdAt` value: an explicit timestamp or an ISO 8601
/// (RFC 3339) string.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatedAtInput {
    Timestamp(DateTime<Utc>),
    Iso(String),
}

/// Validation error raised before any write occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    /// Every message must name its primary point.
    MissingMain,
    /// `createdAt` string input could not be parsed as a date.
    InvalidCreatedAt { value: String, message: String },
}

impl Display for MessageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMain => write!(f, "message is missing its main point id"),
            Self::InvalidCreatedAt { value, message } => {
                write!(f, "invalid message createdAt `{value}`: {message}")
            }
        }
    }
}

impl Error for MessageValidationError {}

/// Caller-supplied message to assemble and persist.
///
/// `id` plus `revision` together request an upsert of an existing message;
/// any other combination lets the store assign a fresh id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageInput {
    pub id: Option<String>,
    pub revision: Option<String>,
    /// Prior message id this message supersedes.
    pub revision_of: Option<String>,
    /// Primary point id; `None` fails validation.
    pub main: Option<String>,
    pub shapes: ShapeMap,
    /// Defaults to the current time when absent.
    pub created_at: Option<CreatedAtInput>,
}

impl MessageInput {
    /// Creates an input with only the primary point set.
    pub fn with_main(main: impl Into<String>) -> Self {
        Self {
            main: Some(main.into()),
            ..Self::default()
        }
    }
}

/// Stored document shape of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    pub main: String,
    pub created_at: i64,
    pub author: String,
    #[serde(default)]
    pub shapes: ShapeMap,
    #[serde(default)]
    pub all_points: Vec<String>,
}

/// Rehydrated message as returned by read and search paths.
///
/// Points are not inlined; fetch them through `get_points_for_message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub revision: String,
    pub revision_of: Option<String>,
    pub main: String,
    pub shapes: ShapeMap,
    pub created_at: DateTime<Utc>,
    pub author: String,
    /// Denormalized set of every point id reachable from this message.
    pub all_points: Vec<String>,
}

impl Message {
    /// Decodes a stored document, rehydrating `created_at`.
    pub(crate) fn from_document(doc: &Document) -> Result<Self, String> {
        let record: MessageRecord = serde_json::from_value(Value::Object(doc.body.clone()))
            .map_err(|err| format!("invalid message document `{}`: {err}", doc.id))?;

        let created_at = Utc
            .timestamp_millis_opt(record.created_at)
            .single()
            .ok_or_else(|| {
                format!(
                    "out-of-range createdAt `{}` in message `{}`",
                    record.created_at, doc.id
                )
            })?;

        Ok(Self {
            id: doc.id.clone(),
            revision: doc.revision.clone(),
            revision_of: record.revision_of,
            main: record.main,
            shapes: record.shapes,
            created_at,
            author: record.author,
            all_points: record.all_points,
        })
    }
}

/// Normalizes a write-time `createdAt` to epoch milliseconds.
///
/// Absent input defaults to the current time; an unparseable ISO string is
/// a validation failure.
pub(crate) fn normalize_created_at(
    input: Option<&CreatedAtInput>,
) -> Result<i64, MessageValidationError> {
    match input {
        None => Ok(Utc::now().timestamp_millis()),
        Some(CreatedAtInput::Timestamp(ts)) => Ok(ts.timestamp_millis()),
        Some(CreatedAtInput::Iso(raw)) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.timestamp_millis())
            .map_err(|err| MessageValidationError::InvalidCreatedAt {
                value: raw.clone(),
                message: err.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_created_at, CreatedAtInput, MessageValidationError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamp_input_keeps_millis() {
        let ts = Utc.timestamp_millis_opt(2000).unwrap();
        let millis = normalize_created_at(Some(&CreatedAtInput::Timestamp(ts))).unwrap();
        assert_eq!(millis, 2000);
    }

    #[test]
    fn iso_input_parses_rfc3339() {
        let input = CreatedAtInput::Iso("1970-01-01T00:00:03Z".to_string());
        let millis = normalize_created_at(Some(&input)).unwrap();
        assert_eq!(millis, 3000);
    }

    #[test]
    fn malformed_iso_input_is_a_validation_error() {
        let input = CreatedAtInput::Iso("not a date".to_string());
        let err = normalize_created_at(Some(&input)).unwrap_err();
        assert!(matches!(
            err,
            MessageValidationError::InvalidCreatedAt { value, .. } if value == "not a date"
        ));
    }

    #[test]
    fn absent_input_defaults_to_now() {
        let before = Utc::now().timestamp_millis();
        let millis = normalize_created_at(None).unwrap();
        let after = Utc::now().timestamp_millis();
        assert!(millis >= before && millis <= after);
    }
}
