//! Text tokenization and search entry points.
//!
//! # Responsibility
//! - Normalize free text into the tokens points are indexed under.
//! - Expose the query layer over the document store's `find` primitive.

pub mod query;
pub mod tokenize;
