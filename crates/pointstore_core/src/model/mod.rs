//! Domain model for the discourse store.
//!
//! # Responsibility
//! - Define the canonical point/message/author record shapes.
//! - Own the serde mapping between Rust records and stored JSON bodies.
//!
//! # Invariants
//! - Records serialize in camelCase and omit absent optional fields, so the
//!   persisted document shape is stable across writes.
//! - Messages reference points by id only; point content is never embedded.

pub mod author;
pub mod message;
pub mod point;

/// `type` tag stored on point documents.
pub const DOC_TYPE_POINT: &str = "point";
/// `type` tag stored on message documents.
pub const DOC_TYPE_MESSAGE: &str = "message";
