//! Core domain logic for the pointstore discourse database.
//!
//! A discourse is stored as flat documents: atomic "points" (claims or
//! feelings) and "messages" that reference them. This crate owns the
//! denormalization (`allPoints`), referential integrity and text indexing
//! that sit between graph-shaped caller input and the document store.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::selector::{Condition, FindOptions, Selector, SortDirection, SortField};
pub use db::store::{Document, DocumentStore, JsonMap, StoreError, StoreResult};
pub use logging::{init_logging, logging_status};
pub use model::author::{AuthorInfo, AuthorPatch, AUTHOR_DOC_ID};
pub use model::message::{
    CreatedAtInput, Message, MessageInput, MessageValidationError, ShapeMap,
};
pub use model::point::{Point, PointReference};
pub use repo::message_repo::PointStore;
pub use repo::{PointReferenceError, RepoError, RepoResult};
pub use search::query::{
    default_sort, search_messages, search_messages_for_points, search_points_by_content,
    SearchError, SearchOptions, SearchResult, DEFAULT_PAGE_SIZE,
};
pub use search::tokenize::tokenize;
pub use service::discourse_service::DiscourseService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
