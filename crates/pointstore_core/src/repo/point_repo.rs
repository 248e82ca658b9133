//! Point persistence: validation, token derivation, upsert semantics.
//!
//! # Responsibility
//! - Create and update atomic point records.
//! - Derive `searchTokens` from content on every write.
//!
//! # Invariants
//! - `searchTokens` is stored only when content yields at least one token.
//! - `createdAt` is defaulted to the current time when absent.
//! - Reads do not verify the stored `type` tag (documented behavior).

use crate::db::store::{DocumentStore, JsonMap};
use crate::model::point::Point;
use crate::model::DOC_TYPE_POINT;
use crate::repo::{RepoError, RepoResult};
use crate::search::tokenize::tokenize;
use chrono::Utc;
use log::debug;
use serde_json::Value;

/// Repository for atomic point records.
pub struct PointRepository<'store> {
    store: &'store DocumentStore,
}

impl<'store> PointRepository<'store> {
    pub fn new(store: &'store DocumentStore) -> Self {
        Self { store }
    }

    /// Persists a point and returns its identifier.
    ///
    /// # Contract
    /// - No `id`: the store assigns one (insert).
    /// - `id` without `revision`: create under the caller-chosen id; an
    ///   occupied id is a conflict.
    /// - `id` with `revision`: compare-and-swap update of the stored copy.
    pub fn add_point(&self, point: &Point) -> RepoResult<String> {
        let mut record = point.clone();

        record.search_tokens = record.content.as_deref().map(tokenize).filter(|tokens| {
            // Omit the field entirely rather than storing an empty list.
            !tokens.is_empty()
        });
        if record.created_at.is_none() {
            record.created_at = Some(Utc::now().timestamp_millis());
        }

        let id = record.id.take();
        let revision = record.revision.take();
        let body = point_body(&record)?;

        let point_id = match id {
            None => self.store.create(&body)?.0,
            Some(id) => {
                self.store.put(&id, revision.as_deref(), &body)?;
                id
            }
        };

        debug!("event=point_add module=repo status=ok point_id={point_id}");
        Ok(point_id)
    }

    /// Fetches a single point by identifier.
    pub fn get_point(&self, id: &str) -> RepoResult<Point> {
        let doc = self.store.get(id)?;
        Point::from_document(&doc).map_err(RepoError::InvalidData)
    }
}

/// Serializes a point into a tagged document body.
///
/// Expects `id` and `revision` to already be cleared; the store carries
/// those as columns, not body fields.
fn point_body(record: &Point) -> RepoResult<JsonMap> {
    let value = serde_json::to_value(record)
        .map_err(|err| RepoError::InvalidData(format!("unserializable point: {err}")))?;
    let Value::Object(mut body) = value else {
        return Err(RepoError::InvalidData(
            "point did not serialize to an object".to_string(),
        ));
    };
    body.insert("type".to_string(), Value::String(DOC_TYPE_POINT.to_string()));
    Ok(body)
}
