//! Author/identity record.
//!
//! # Responsibility
//! - Define the singleton profile document at a fixed well-known id.
//! - Express partial updates as an explicit merge patch.
//!
//! # Invariants
//! - Patch fields win over current fields; unspecified fields are kept.
//! - The record id never changes.

use crate::db::store::{Document, JsonMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known id of the singleton author record.
pub const AUTHOR_DOC_ID: &str = "author";

/// Singleton author profile.
///
/// Beyond `name`, fields are caller-defined and kept in `extra` verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthorInfo {
    #[serde(skip)]
    pub id: String,
    #[serde(skip)]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl AuthorInfo {
    /// Empty shell record at the well-known id.
    pub(crate) fn shell(revision: impl Into<String>) -> Self {
        Self {
            id: AUTHOR_DOC_ID.to_string(),
            revision: Some(revision.into()),
            ..Self::default()
        }
    }

    /// Decodes the stored record, adopting the store's id and revision.
    pub(crate) fn from_document(doc: &Document) -> Result<Self, String> {
        let mut info: AuthorInfo = serde_json::from_value(Value::Object(doc.body.clone()))
            .map_err(|err| format!("invalid author document `{}`: {err}", doc.id))?;
        info.id = doc.id.clone();
        info.revision = Some(doc.revision.clone());
        Ok(info)
    }

    /// Shallow-merges a patch over this record.
    pub fn apply(&mut self, patch: &AuthorPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Merge patch for [`AuthorInfo`]: only named fields are replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub extra: JsonMap,
}

impl AuthorPatch {
    /// Patch that only sets the display name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds one free-form field to the patch.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthorInfo, AuthorPatch};
    use serde_json::json;

    #[test]
    fn apply_overwrites_named_fields_and_keeps_the_rest() {
        let mut info = AuthorInfo::shell("1");
        info.apply(&AuthorPatch::name("Alice").with_field("color", "blue"));
        info.apply(&AuthorPatch::default().with_field("color", "green"));

        assert_eq!(info.name.as_deref(), Some("Alice"));
        assert_eq!(info.extra.get("color"), Some(&json!("green")));
    }
}
