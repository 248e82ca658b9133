//! Repository layer over the generic document store.
//!
//! # Responsibility
//! - Define the point, message and author persistence contracts.
//! - Translate between typed domain records and stored JSON documents.
//!
//! # Invariants
//! - Write paths validate and resolve references before any store write
//!   for the current call (points persisted by an earlier step of the same
//!   call are not rolled back).
//! - Read paths reject undecodable persisted state instead of masking it.

use crate::db::store::StoreError;
use crate::model::message::MessageValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_repo;
pub mod message_repo;
pub mod point_repo;

pub use message_repo::PointReferenceError;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence, validation and reference resolution.
#[derive(Debug)]
pub enum RepoError {
    Validation(MessageValidationError),
    Reference(PointReferenceError),
    Store(StoreError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Reference(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "{message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Reference(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<MessageValidationError> for RepoError {
    fn from(value: MessageValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PointReferenceError> for RepoError {
    fn from(value: PointReferenceError) -> Self {
        Self::Reference(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
