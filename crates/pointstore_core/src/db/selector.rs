//! Query-by-example selector and sort descriptors for document `find`.
//!
//! # Responsibility
//! - Describe field conditions, sort order and pagination as plain data.
//! - Keep callers away from the SQL that [`super::store`] derives from them.
//!
//! # Invariants
//! - All clauses of a selector must hold for a document to match (AND).
//! - A field may carry several clauses; each is applied independently.

use serde_json::Value;

/// Single-field match condition inside a [`Selector`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the given scalar value.
    Eq(Value),
    /// Field is strictly greater than the given scalar value.
    Gt(Value),
    /// Field is greater than or equal to the given scalar value.
    Gte(Value),
    /// Field is strictly less than the given scalar value.
    Lt(Value),
    /// Field is less than or equal to the given scalar value.
    Lte(Value),
    /// Field is present with a non-null value.
    Exists,
    /// Array field contains every one of the given values.
    ///
    /// An empty value list is vacuously true.
    ContainsAll(Vec<String>),
    /// Array field contains at least one of the given values.
    ///
    /// An empty value list matches nothing.
    ContainsAny(Vec<String>),
}

impl Condition {
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Eq(value.into())
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Self::Gt(value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Self::Gte(value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Self::Lt(value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Self::Lte(value.into())
    }
}

/// Conjunction of field conditions matched against document bodies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    clauses: Vec<(String, Condition)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one clause; builder style so selectors compose left to right.
    pub fn field(mut self, name: impl Into<String>, condition: Condition) -> Self {
        self.clauses.push((name.into(), condition));
        self
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }
}

/// Sort direction for one [`SortField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One field of a multi-key sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Pagination and sort options for document `find`.
///
/// `limit = None` returns all matches; ties inside the requested sort break
/// toward newer rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<SortField>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}
