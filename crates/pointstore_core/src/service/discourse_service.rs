//! Discourse store facade.
//!
//! # Responsibility
//! - Own the document store handle and the configured author URL.
//! - Expose the full caller surface: author info, points, messages,
//!   searches, plus `init`/`close` lifecycle.
//!
//! # Invariants
//! - `author` on persisted messages always comes from the configured
//!   author URL, never from caller input.
//! - `init` only declares indexes; queries stay correct without it.

use crate::db::selector::Selector;
use crate::db::store::{DocumentStore, StoreResult};
use crate::model::author::{AuthorInfo, AuthorPatch};
use crate::model::message::{Message, MessageInput};
use crate::model::point::Point;
use crate::repo::author_repo::AuthorRepository;
use crate::repo::message_repo::{MessageRepository, PointStore};
use crate::repo::point_repo::PointRepository;
use crate::repo::RepoResult;
use crate::search::query::{
    search_messages, search_messages_for_points, search_points_by_content, SearchOptions,
    SearchResult,
};
use log::info;
use std::path::Path;

/// Single-owner handle over one discourse store instance.
pub struct DiscourseService {
    store: DocumentStore,
    author_url: String,
}

impl DiscourseService {
    /// Opens a file-backed store.
    pub fn open(path: impl AsRef<Path>, author_url: impl Into<String>) -> StoreResult<Self> {
        Ok(Self {
            store: DocumentStore::open(path)?,
            author_url: author_url.into(),
        })
    }

    /// Opens an in-memory store; used by tests and smoke tooling.
    pub fn open_in_memory(author_url: impl Into<String>) -> StoreResult<Self> {
        Ok(Self {
            store: DocumentStore::open_in_memory()?,
            author_url: author_url.into(),
        })
    }

    /// Declares the indexes backing the query layer's selectors.
    pub fn init(&self) -> StoreResult<()> {
        self.store.define_index(&["type"])?;
        self.store.define_index(&["type", "createdAt"])?;
        self.store.define_index(&["type", "createdAt", "searchTokens"])?;
        self.store.define_index(&["type", "createdAt", "allPoints"])?;
        info!("event=service_init module=service status=ok indexes=4");
        Ok(())
    }

    /// Closes the underlying store.
    pub fn close(self) -> StoreResult<()> {
        self.store.close()
    }

    /// Author URL stamped onto every persisted message.
    pub fn author_url(&self) -> &str {
        &self.author_url
    }

    /// Direct access to the document store primitives.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn get_author_info(&self) -> RepoResult<AuthorInfo> {
        AuthorRepository::new(&self.store).get_author_info()
    }

    pub fn set_author_info(&self, patch: &AuthorPatch) -> RepoResult<AuthorInfo> {
        AuthorRepository::new(&self.store).set_author_info(patch)
    }

    pub fn add_point(&self, point: &Point) -> RepoResult<String> {
        PointRepository::new(&self.store).add_point(point)
    }

    pub fn get_point(&self, id: &str) -> RepoResult<Point> {
        PointRepository::new(&self.store).get_point(id)
    }

    pub fn add_message(&self, input: &MessageInput, points: &PointStore) -> RepoResult<String> {
        MessageRepository::new(&self.store, &self.author_url).add_message(input, points)
    }

    pub fn get_message(&self, id: &str) -> RepoResult<Message> {
        MessageRepository::new(&self.store, &self.author_url).get_message(id)
    }

    pub fn get_points_for_message(&self, message: &Message) -> RepoResult<PointStore> {
        MessageRepository::new(&self.store, &self.author_url).get_points_for_message(message)
    }

    pub fn search_messages(
        &self,
        selector: Selector,
        options: &SearchOptions,
    ) -> SearchResult<Vec<Message>> {
        search_messages(&self.store, selector, options)
    }

    pub fn search_messages_for_points(
        &self,
        points: &[Point],
        options: &SearchOptions,
    ) -> SearchResult<Vec<Message>> {
        search_messages_for_points(&self.store, points, options)
    }

    pub fn search_points_by_content(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> SearchResult<Vec<Point>> {
        search_points_by_content(&self.store, query, options)
    }
}
