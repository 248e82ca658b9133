//! Author/identity record persistence.
//!
//! # Responsibility
//! - Read and update the singleton profile record.
//!
//! # Invariants
//! - `get_author_info` never fails due to record absence; the shell record
//!   is created on first access.
//! - Updates write against the revision obtained by the preceding fetch;
//!   a stale revision surfaces a conflict, which is not retried here.

use crate::db::store::{DocumentStore, JsonMap, StoreError};
use crate::model::author::{AuthorInfo, AuthorPatch, AUTHOR_DOC_ID};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use serde_json::Value;

/// Repository for the singleton author record.
pub struct AuthorRepository<'store> {
    store: &'store DocumentStore,
}

impl<'store> AuthorRepository<'store> {
    pub fn new(store: &'store DocumentStore) -> Self {
        Self { store }
    }

    /// Fetches the author record, creating the empty shell on first access.
    pub fn get_author_info(&self) -> RepoResult<AuthorInfo> {
        match self.store.get(AUTHOR_DOC_ID) {
            Ok(doc) => AuthorInfo::from_document(&doc).map_err(RepoError::InvalidData),
            Err(StoreError::NotFound(_)) => {
                let revision = self.store.put(AUTHOR_DOC_ID, None, &JsonMap::new())?;
                debug!("event=author_init module=repo status=ok");
                Ok(AuthorInfo::shell(revision))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Shallow-merges a patch over the current record and persists it.
    ///
    /// Patch fields win; unspecified fields are preserved. The record id
    /// never changes.
    pub fn set_author_info(&self, patch: &AuthorPatch) -> RepoResult<AuthorInfo> {
        let mut current = self.get_author_info()?;
        current.apply(patch);

        let body = author_body(&current)?;
        let revision = self
            .store
            .put(AUTHOR_DOC_ID, current.revision.as_deref(), &body)?;
        current.revision = Some(revision);
        Ok(current)
    }
}

fn author_body(info: &AuthorInfo) -> RepoResult<JsonMap> {
    let value = serde_json::to_value(info)
        .map_err(|err| RepoError::InvalidData(format!("unserializable author info: {err}")))?;
    let Value::Object(body) = value else {
        return Err(RepoError::InvalidData(
            "author info did not serialize to an object".to_string(),
        ));
    };
    Ok(body)
}
