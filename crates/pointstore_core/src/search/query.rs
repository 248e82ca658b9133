//! Query layer over the document store's `find` primitive.
//!
//! # Responsibility
//! - Build selector/sort/pagination parameters for message search, content
//!   search and point-containment search.
//! - Rehydrate matched documents into typed records.
//!
//! # Invariants
//! - Message queries always carry `type = "message"` and a `createdAt`
//!   existence guard on top of the caller selector.
//! - Content search is conjunctive: a point must hold every query token.

use crate::db::selector::{Condition, FindOptions, Selector, SortField};
use crate::db::store::{Document, DocumentStore, StoreError};
use crate::model::message::Message;
use crate::model::point::Point;
use crate::model::{DOC_TYPE_MESSAGE, DOC_TYPE_POINT};
use crate::search::tokenize::tokenize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size applied when the caller does not pass a limit.
pub const DEFAULT_PAGE_SIZE: u32 = 32;

/// Default sort: `type` descending, then `createdAt` descending, so the
/// newest records surface first.
pub fn default_sort() -> Vec<SortField> {
    vec![SortField::desc("type"), SortField::desc("createdAt")]
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for store interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    Store(StoreError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search result: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Pagination and sort options for the search entry points.
///
/// Unset fields fall back to [`DEFAULT_PAGE_SIZE`] and [`default_sort`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub sort: Option<Vec<SortField>>,
}

impl SearchOptions {
    fn to_find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort.clone().unwrap_or_else(default_sort),
            limit: Some(self.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            skip: self.skip,
        }
    }
}

/// Searches messages matching the caller selector.
///
/// The selector is merged with the mandatory `type = "message"` clause and
/// a `createdAt` existence guard, so messages lacking a timestamp are
/// never returned.
pub fn search_messages(
    store: &DocumentStore,
    selector: Selector,
    options: &SearchOptions,
) -> SearchResult<Vec<Message>> {
    let selector = selector
        .field("type", Condition::eq(DOC_TYPE_MESSAGE))
        .field("createdAt", Condition::Exists);

    let docs = store.find(&selector, &options.to_find_options())?;
    docs.iter().map(decode_message).collect()
}

/// Searches messages whose `allPoints` set intersects the given points.
///
/// This is the containment query the `allPoints` denormalization exists
/// for: one indexed check instead of a graph walk.
pub fn search_messages_for_points(
    store: &DocumentStore,
    points: &[Point],
    options: &SearchOptions,
) -> SearchResult<Vec<Message>> {
    let ids: Vec<String> = points.iter().filter_map(|point| point.id.clone()).collect();
    let selector = Selector::new().field("allPoints", Condition::ContainsAny(ids));
    search_messages(store, selector, options)
}

/// Searches points whose content contains every token of the query.
///
/// A query yielding no tokens returns an empty result set.
pub fn search_points_by_content(
    store: &DocumentStore,
    query: &str,
    options: &SearchOptions,
) -> SearchResult<Vec<Point>> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let selector = Selector::new()
        .field("type", Condition::eq(DOC_TYPE_POINT))
        .field("createdAt", Condition::Exists)
        .field("searchTokens", Condition::ContainsAll(tokens));

    let docs = store.find(&selector, &options.to_find_options())?;
    docs.iter().map(decode_point).collect()
}

fn decode_message(doc: &Document) -> SearchResult<Message> {
    Message::from_document(doc).map_err(SearchError::InvalidData)
}

fn decode_point(doc: &Document) -> SearchResult<Point> {
    Point::from_document(doc).map_err(SearchError::InvalidData)
}
