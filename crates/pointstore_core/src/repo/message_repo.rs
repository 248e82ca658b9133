//! Message assembly: reference resolution, denormalization, persistence.
//!
//! # Responsibility
//! - Resolve a message's point graph into the flat `allPoints` set.
//! - Persist unsaved referenced points through the point repository.
//! - Rehydrate stored messages and their directly referenced points.
//!
//! # Invariants
//! - `allPoints` is a superset of `{main} ∪ flatten(shapes)` and is
//!   recomputed in full on every write.
//! - Reference resolution is a worklist closure with a visited set, so
//!   `referenceHistory` cycles terminate and order stays deterministic.
//! - Validation and reference errors surface before the message write.

use crate::db::store::{DocumentStore, JsonMap};
use crate::model::message::{
    normalize_created_at, Message, MessageInput, MessageRecord, MessageValidationError,
};
use crate::model::point::Point;
use crate::model::DOC_TYPE_MESSAGE;
use crate::repo::point_repo::PointRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-supplied mapping from point id to the full point object, covering
/// every point a message references directly or through history.
pub type PointStore = BTreeMap<String, Point>;

/// Reference-resolution error naming the offending point id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointReferenceError {
    /// The id is referenced by the message but absent from the supplied
    /// point store.
    Unresolved(String),
    /// The supplied point object does not carry its own id.
    Unidentified(String),
}

impl Display for PointReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved(id) => write!(f, "referenced point not supplied: {id}"),
            Self::Unidentified(id) => {
                write!(f, "supplied point for `{id}` is missing its own id")
            }
        }
    }
}

impl Error for PointReferenceError {}

/// Repository assembling and rehydrating message documents.
pub struct MessageRepository<'store> {
    store: &'store DocumentStore,
    points: PointRepository<'store>,
    author_url: &'store str,
}

impl<'store> MessageRepository<'store> {
    pub fn new(store: &'store DocumentStore, author_url: &'store str) -> Self {
        Self {
            store,
            points: PointRepository::new(store),
            author_url,
        }
    }

    /// Validates, resolves and persists a message.
    ///
    /// # Contract
    /// - `main` is required; its absence is a validation failure.
    /// - Every id reachable from `main`, `shapes` or a referenced point's
    ///   `referenceHistory` must resolve in `point_store`.
    /// - Referenced points without a revision are persisted first, with the
    ///   message's normalized timestamp as their default creation time.
    /// - Points persisted by an earlier step are not rolled back when a
    ///   later step fails.
    ///
    /// Returns the message id (caller-supplied on upsert, store-assigned
    /// otherwise).
    pub fn add_message(&self, input: &MessageInput, point_store: &PointStore) -> RepoResult<String> {
        let main = input
            .main
            .clone()
            .ok_or(MessageValidationError::MissingMain)?;
        let created_at = normalize_created_at(input.created_at.as_ref())?;

        let mut all_points: Vec<String> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut worklist: VecDeque<String> = VecDeque::new();

        enqueue(&mut all_points, &mut visited, &mut worklist, &main);
        for ids in input.shapes.values() {
            for id in ids {
                enqueue(&mut all_points, &mut visited, &mut worklist, id);
            }
        }

        while let Some(id) = worklist.pop_front() {
            let point = point_store
                .get(&id)
                .ok_or_else(|| PointReferenceError::Unresolved(id.clone()))?;
            if point.id.is_none() {
                return Err(PointReferenceError::Unidentified(id.clone()).into());
            }

            if !point.is_saved() {
                let mut unsaved = point.clone();
                if unsaved.created_at.is_none() {
                    unsaved.created_at = Some(created_at);
                }
                self.points.add_point(&unsaved)?;
            }

            if let Some(history) = &point.reference_history {
                for reference in history {
                    enqueue(&mut all_points, &mut visited, &mut worklist, &reference.point_id);
                }
            }
        }

        let record = MessageRecord {
            revision_of: input.revision_of.clone(),
            main,
            created_at,
            author: self.author_url.to_string(),
            shapes: input.shapes.clone(),
            all_points,
        };
        let body = message_body(&record)?;

        let message_id = match (&input.id, &input.revision) {
            (Some(id), Some(revision)) => {
                self.store.put(id, Some(revision), &body)?;
                id.clone()
            }
            _ => self.store.create(&body)?.0,
        };

        info!(
            "event=message_add module=repo status=ok message_id={message_id} points={}",
            record.all_points.len()
        );
        Ok(message_id)
    }

    /// Fetches one message by id, rehydrating its timestamp.
    pub fn get_message(&self, id: &str) -> RepoResult<Message> {
        let doc = self.store.get(id)?;
        Message::from_document(&doc).map_err(RepoError::InvalidData)
    }

    /// Fetches the points a message references directly.
    ///
    /// Covers `main` and every `shapes` entry, not `referenceHistory`
    /// back-links. A point deleted out-of-band fails the whole call; there
    /// is no partial result.
    pub fn get_points_for_message(&self, message: &Message) -> RepoResult<PointStore> {
        let mut seen = HashSet::new();
        let mut ids: Vec<&String> = Vec::new();

        if seen.insert(message.main.clone()) {
            ids.push(&message.main);
        }
        for shape_ids in message.shapes.values() {
            for id in shape_ids {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        let mut points = PointStore::new();
        for id in ids {
            points.insert(id.clone(), self.points.get_point(id)?);
        }
        Ok(points)
    }
}

fn enqueue(
    all_points: &mut Vec<String>,
    visited: &mut HashSet<String>,
    worklist: &mut VecDeque<String>,
    id: &str,
) {
    if visited.insert(id.to_string()) {
        all_points.push(id.to_string());
        worklist.push_back(id.to_string());
    }
}

/// Serializes a message record into a tagged document body.
fn message_body(record: &MessageRecord) -> RepoResult<JsonMap> {
    let value = serde_json::to_value(record)
        .map_err(|err| RepoError::InvalidData(format!("unserializable message: {err}")))?;
    let Value::Object(mut body) = value else {
        return Err(RepoError::InvalidData(
            "message did not serialize to an object".to_string(),
        ));
    };
    body.insert(
        "type".to_string(),
        Value::String(DOC_TYPE_MESSAGE.to_string()),
    );
    Ok(body)
}
