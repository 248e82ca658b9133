//! Generic JSON document store over SQLite.
//!
//! # Responsibility
//! - Persist schemaless JSON bodies under store- or caller-assigned ids.
//! - Enforce optimistic concurrency through per-document revision tokens.
//! - Answer query-by-example `find` calls via SQLite JSON1 functions.
//!
//! # Invariants
//! - Revision tokens are opaque to callers; internally they count writes.
//! - An update only succeeds when the caller presents the current token.
//! - Declared indexes affect performance only, never result correctness.

use crate::db::selector::{Condition, FindOptions, Selector, SortDirection};
use crate::db::{open_db, open_db_in_memory, DbError};
use log::info;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

/// JSON object used as a document body.
pub type JsonMap = serde_json::Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store error for persistence, concurrency and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// No document exists under the requested id.
    NotFound(String),
    /// A write raced a newer revision, or targeted an id that already exists.
    Conflict(String),
    /// A selector, sort or index referenced an unusable field name.
    InvalidField(String),
    /// A persisted row could not be decoded as a JSON document.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::Conflict(id) => write!(f, "revision conflict on document: {id}"),
            Self::InvalidField(name) => write!(f, "invalid document field name: `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored document together with its store-managed metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub revision: String,
    pub body: JsonMap,
}

/// SQLite-backed document store exposing the primitive surface the
/// repository layer is written against.
pub struct DocumentStore {
    conn: Connection,
}

impl DocumentStore {
    /// Opens a store backed by a database file, applying migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a store backed by an in-memory database, applying migrations.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Inserts a new document under a store-assigned id.
    ///
    /// Returns the assigned id and the initial revision token.
    pub fn create(&self, body: &JsonMap) -> StoreResult<(String, String)> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO documents (doc_id, revision, body) VALUES (?1, 1, ?2);",
            params![id, serialize_body(body)?],
        )?;
        Ok((id, revision_token(1)))
    }

    /// Writes a document under a caller-chosen id.
    ///
    /// # Contract
    /// - `expected_revision = None` inserts; an occupied id is a `Conflict`.
    /// - `expected_revision = Some(token)` updates; a stale token is a
    ///   `Conflict`, an absent document is `NotFound`.
    ///
    /// Returns the new revision token.
    pub fn put(
        &self,
        id: &str,
        expected_revision: Option<&str>,
        body: &JsonMap,
    ) -> StoreResult<String> {
        match expected_revision {
            None => {
                let inserted = self.conn.execute(
                    "INSERT OR IGNORE INTO documents (doc_id, revision, body)
                     VALUES (?1, 1, ?2);",
                    params![id, serialize_body(body)?],
                )?;
                if inserted == 0 {
                    return Err(StoreError::Conflict(id.to_string()));
                }
                Ok(revision_token(1))
            }
            Some(token) => {
                let current = parse_revision_token(id, token)?;
                let changed = self.conn.execute(
                    "UPDATE documents
                     SET revision = revision + 1, body = ?1
                     WHERE doc_id = ?2 AND revision = ?3;",
                    params![serialize_body(body)?, id, current],
                )?;
                if changed == 0 {
                    if self.exists(id)? {
                        return Err(StoreError::Conflict(id.to_string()));
                    }
                    return Err(StoreError::NotFound(id.to_string()));
                }
                Ok(revision_token(current + 1))
            }
        }
    }

    /// Fetches one document by id.
    pub fn get(&self, id: &str) -> StoreResult<Document> {
        let mut stmt = self
            .conn
            .prepare("SELECT doc_id, revision, body FROM documents WHERE doc_id = ?1;")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_document_row(row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Runs a query-by-example scan over document bodies.
    ///
    /// Every selector clause must hold; sort keys are evaluated over
    /// `json_extract` with ties breaking toward newer rows.
    pub fn find(&self, selector: &Selector, options: &FindOptions) -> StoreResult<Vec<Document>> {
        let mut sql =
            String::from("SELECT d.doc_id, d.revision, d.body FROM documents AS d WHERE 1 = 1");
        let mut bind_values: Vec<SqlValue> = Vec::new();

        for (field, condition) in selector.clauses() {
            append_condition(&mut sql, &mut bind_values, field, condition)?;
        }

        sql.push_str(" ORDER BY ");
        for sort in &options.sort {
            let direction = match sort.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            sql.push_str(&format!(
                "{} {direction}, ",
                json_path(&sort.field, "d.body")?
            ));
        }
        // Stable tail: equal sort keys surface the most recent write first.
        sql.push_str("d.rowid DESC");

        if let Some(limit) = options.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(SqlValue::Integer(i64::from(limit)));
            if let Some(skip) = options.skip {
                sql.push_str(" OFFSET ?");
                bind_values.push(SqlValue::Integer(i64::from(skip)));
            }
        } else if let Some(skip) = options.skip {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(SqlValue::Integer(i64::from(skip)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }

        Ok(documents)
    }

    /// Declares a covering index over the given body fields.
    ///
    /// Idempotent; purely a query-planner hint for `find`.
    pub fn define_index(&self, fields: &[&str]) -> StoreResult<()> {
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            columns.push(json_path(field, "body")?);
        }

        let name = format!("idx_documents_{}", fields.join("_"));
        self.conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS {name} ON documents ({});",
            columns.join(", ")
        ))?;
        info!("event=index_define module=db status=ok fields={}", fields.join(","));
        Ok(())
    }

    /// Closes the underlying connection.
    pub fn close(self) -> StoreResult<()> {
        self.conn
            .close()
            .map_err(|(_conn, err)| StoreError::Db(DbError::Sqlite(err)))
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE doc_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn append_condition(
    sql: &mut String,
    bind_values: &mut Vec<SqlValue>,
    field: &str,
    condition: &Condition,
) -> StoreResult<()> {
    let extract = json_path(field, "d.body")?;

    match condition {
        Condition::Eq(value) => {
            sql.push_str(&format!(" AND {extract} = ?"));
            bind_values.push(scalar_to_sql(field, value)?);
        }
        Condition::Gt(value) => {
            sql.push_str(&format!(" AND {extract} > ?"));
            bind_values.push(scalar_to_sql(field, value)?);
        }
        Condition::Gte(value) => {
            sql.push_str(&format!(" AND {extract} >= ?"));
            bind_values.push(scalar_to_sql(field, value)?);
        }
        Condition::Lt(value) => {
            sql.push_str(&format!(" AND {extract} < ?"));
            bind_values.push(scalar_to_sql(field, value)?);
        }
        Condition::Lte(value) => {
            sql.push_str(&format!(" AND {extract} <= ?"));
            bind_values.push(scalar_to_sql(field, value)?);
        }
        Condition::Exists => {
            sql.push_str(&format!(" AND {extract} IS NOT NULL"));
        }
        Condition::ContainsAll(values) => {
            for value in values {
                sql.push_str(&format!(
                    " AND EXISTS (SELECT 1 FROM json_each(d.body, '$.{field}')
                       WHERE json_each.value = ?)"
                ));
                bind_values.push(SqlValue::Text(value.clone()));
            }
        }
        Condition::ContainsAny(values) => {
            if values.is_empty() {
                sql.push_str(" AND 0 = 1");
                return Ok(());
            }
            let placeholders = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM json_each(d.body, '$.{field}')
                   WHERE json_each.value IN ({placeholders}))"
            ));
            for value in values {
                bind_values.push(SqlValue::Text(value.clone()));
            }
        }
    }

    Ok(())
}

/// Builds the `json_extract` expression for a body field.
///
/// `body_column` names the body column as visible at the call site
/// (`d.body` inside `find`, plain `body` in index DDL, where no table
/// alias exists). Field names are interpolated into SQL, so anything
/// outside `[A-Za-z0-9_]` is rejected instead of escaped.
fn json_path(field: &str, body_column: &str) -> StoreResult<String> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("json_extract({body_column}, '$.{field}')"))
}

fn scalar_to_sql(field: &str, value: &Value) -> StoreResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .ok_or_else(|| StoreError::InvalidField(field.to_string())),
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidField(field.to_string())),
    }
}

fn serialize_body(body: &JsonMap) -> StoreResult<String> {
    serde_json::to_string(body)
        .map_err(|err| StoreError::InvalidData(format!("unserializable body: {err}")))
}

fn parse_document_row(row: &Row<'_>) -> StoreResult<Document> {
    let id: String = row.get("doc_id")?;
    let revision: i64 = row.get("revision")?;
    let body_text: String = row.get("body")?;

    let body = match serde_json::from_str::<Value>(&body_text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(StoreError::InvalidData(format!(
                "document `{id}` body is not a JSON object"
            )))
        }
        Err(err) => {
            return Err(StoreError::InvalidData(format!(
                "document `{id}` body is not valid JSON: {err}"
            )))
        }
    };

    Ok(Document {
        id,
        revision: revision_token(revision),
        body,
    })
}

fn revision_token(revision: i64) -> String {
    revision.to_string()
}

fn parse_revision_token(id: &str, token: &str) -> StoreResult<i64> {
    // A token that never came from this store cannot match any revision.
    token
        .parse::<i64>()
        .map_err(|_| StoreError::Conflict(id.to_string()))
}
